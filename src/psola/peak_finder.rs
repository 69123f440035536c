use crate::common::{Sample, SampleSliceExt};
use crate::config::PsolaConfig;

/// Final candidate delta ranges narrower than this are treated as ties,
/// in which case the candidate closest to the predicted position wins.
const PEAK_DELTA_EPSILON: f32 = 0.05;

/// Locates a sequence of peaks roughly one period apart in a frame. The peaks
/// are used as the centres of analysis grains.
///
/// Analysis windows are one period long and centred on a predicted peak
/// position. Each window is searched outward from the prediction and the
/// chosen peak is the one that best balances amplitude against consistency
/// with the previously found peaks.
pub struct PeakFinder {
    /// Peak indices of the most recent frame, in ascending order.
    peaks: Vec<usize>,
    /// Window indices ordered by increasing distance from the predicted peak.
    search_order: Vec<usize>,
    candidates: Vec<usize>,
    candidate_deltas: Vec<f32>,
    final_handful: Vec<usize>,
    final_handful_deltas: Vec<f32>,
    /// The number of search rounds per window. Each round adds one or two candidates.
    candidate_count: usize,
    final_handful_size: usize,
}

impl PeakFinder {
    pub fn new(max_frame_size: usize) -> Self {
        let defaults = PsolaConfig::default();
        PeakFinder::with_capacity(
            max_frame_size,
            defaults.peak_candidate_count,
            defaults.final_handful_size,
        )
    }

    pub fn from_config(config: &PsolaConfig) -> Self {
        PeakFinder::with_capacity(
            config.max_frame_size,
            config.peak_candidate_count,
            config.final_handful_size,
        )
    }

    fn with_capacity(max_frame_size: usize, candidate_count: usize, final_handful_size: usize) -> Self {
        if candidate_count == 0 || final_handful_size == 0 {
            panic!("Peak candidate counts must be greater than 0")
        }
        let candidate_capacity = 2 * candidate_count;
        PeakFinder {
            peaks: Vec::with_capacity(max_frame_size),
            search_order: Vec::with_capacity(max_frame_size),
            candidates: Vec::with_capacity(candidate_capacity),
            candidate_deltas: Vec::with_capacity(candidate_capacity),
            final_handful: Vec::with_capacity(final_handful_size),
            final_handful_deltas: Vec::with_capacity(final_handful_size),
            candidate_count,
            final_handful_size,
        }
    }

    /// Finds peaks roughly `period` samples apart, returning their
    /// indices in ascending order.
    pub fn find_peaks<S: Sample>(&mut self, samples: &[S], period: usize) -> &[usize] {
        if period == 0 {
            panic!("Period must be greater than 0")
        }
        let sample_count = samples.len();
        if sample_count < 2 * period {
            panic!(
                "Got {} samples, expected at least {} for period {}",
                sample_count,
                2 * period,
                period
            )
        }

        self.peaks.clear();

        // Grains are two periods long and overlap by 50%
        let grain_size = 2 * period;
        let half_period = ((period as f32) * 0.5).round() as usize;

        // The centre of the current analysis window, i.e the predicted peak position
        let mut analysis_index = half_period;

        loop {
            let mut window_start = analysis_index - half_period;
            if let Some(last_peak) = self.peaks.last() {
                window_start = window_start.max(last_peak + 1);
            }
            if window_start >= sample_count {
                break;
            }
            let window_end = sample_count.min(window_start + period);
            let predicted_peak = analysis_index.max(window_start).min(window_end - 1);

            let peak = self.find_next_peak(samples, window_start, window_end, predicted_peak, period, grain_size);
            self.peaks.push(peak);

            let previous_analysis_index = analysis_index;
            let peak_count = self.peaks.len();
            analysis_index = if peak_count == 1 {
                self.peaks[0] + period
            } else {
                self.peaks[peak_count - 2] + grain_size
            };
            if analysis_index <= previous_analysis_index {
                // Guarantee forward progress
                analysis_index = previous_analysis_index + period;
            }

            if analysis_index - half_period >= sample_count {
                break;
            }
        }

        &self.peaks
    }

    /// The peaks found by the most recent call to `find_peaks`.
    pub fn peaks(&self) -> &[usize] {
        &self.peaks
    }

    fn find_next_peak<S: Sample>(
        &mut self,
        samples: &[S],
        window_start: usize,
        window_end: usize,
        predicted_peak: usize,
        period: usize,
        grain_size: usize,
    ) -> usize {
        self.sort_search_order(window_start, window_end, predicted_peak);

        self.candidates.clear();
        for _ in 0..self.candidate_count {
            if !self.add_candidates(samples, window_start, window_end, predicted_peak) {
                break;
            }
        }

        let peak_count = self.peaks.len();
        match self.candidates.len() {
            0 => predicted_peak,
            1 => self.candidates[0],
            2 => loudest_candidate(&self.candidates, samples),
            _ if peak_count < 2 => loudest_candidate(&self.candidates, samples),
            _ => {
                let period_target = self.peaks[peak_count - 1] + period;
                let grain_target = self.peaks[peak_count - 2] + grain_size;
                self.choose_ideal_candidate(samples, period_target, grain_target)
            }
        }
    }

    /// Orders the indices of `[window_start, window_end)` by distance from
    /// the predicted peak, alternating between the right and left side.
    fn sort_search_order(&mut self, window_start: usize, window_end: usize, predicted_peak: usize) {
        debug_assert!(predicted_peak >= window_start && predicted_peak < window_end);
        self.search_order.clear();
        self.search_order.push(predicted_peak);

        let mut right_offset = 1;
        let mut left_offset = 1;
        for n in 1..(window_end - window_start) {
            let right_available = predicted_peak + right_offset < window_end;
            let left_available = predicted_peak >= window_start + left_offset;
            let take_right = if n % 2 == 1 { right_available } else { !left_available };
            if take_right {
                self.search_order.push(predicted_peak + right_offset);
                right_offset += 1;
            } else {
                self.search_order.push(predicted_peak - left_offset);
                left_offset += 1;
            }
        }
    }

    /// Adds the proximity weighted minimum and/or maximum among the indices
    /// not yet claimed as candidates. Returns false if every index in the
    /// window has already been claimed.
    fn add_candidates<S: Sample>(
        &mut self,
        samples: &[S],
        window_start: usize,
        window_end: usize,
        predicted_peak: usize,
    ) -> bool {
        let candidates = &self.candidates;
        let starting_index = match self.search_order.iter().find(|index| !candidates.contains(*index)) {
            Some(index) => *index,
            None => return false,
        };

        let window_len = (window_end - window_start) as f32;
        let weighted_sample = |index: usize| {
            let weight = 1.0 - 0.5 * (distance(index, predicted_peak) as f32) / window_len;
            samples[index].to_f32_lossy() * weight
        };

        let mut local_min = weighted_sample(starting_index);
        let mut local_max = local_min;
        let mut min_index = starting_index;
        let mut max_index = starting_index;

        for index in self.search_order.iter() {
            if *index == starting_index || candidates.contains(index) {
                continue;
            }
            let value = weighted_sample(*index);
            if value < local_min {
                local_min = value;
                min_index = *index;
            }
            if value > local_max {
                local_max = value;
                max_index = *index;
            }
        }

        if min_index == max_index {
            self.candidates.push(max_index);
        } else if local_max < 0.0 {
            self.candidates.push(min_index);
        } else if local_min > 0.0 {
            self.candidates.push(max_index);
        } else {
            // The extrema disagree in sign, keep both
            self.candidates.push(min_index.min(max_index));
            self.candidates.push(min_index.max(max_index));
        }
        true
    }

    /// Picks the loudest of the candidates closest to where the previous
    /// peaks say the next peak should be.
    fn choose_ideal_candidate<S: Sample>(&mut self, samples: &[S], period_target: usize, grain_target: usize) -> usize {
        self.candidate_deltas.clear();
        self.final_handful.clear();
        self.final_handful_deltas.clear();

        for candidate in self.candidates.iter() {
            let delta = 0.5 * (distance(*candidate, period_target) + distance(*candidate, grain_target)) as f32;
            self.candidate_deltas.push(delta);
        }

        // Keep the candidates with the lowest deltas, in ascending delta order
        let handful_size = self.final_handful_size.min(self.candidate_deltas.len());
        for _ in 0..handful_size {
            let (delta, position) = match self.candidate_deltas.min_and_index() {
                Some(min) => min,
                None => break,
            };
            self.final_handful_deltas.push(delta);
            self.final_handful.push(self.candidates[position]);
            self.candidate_deltas[position] = f32::INFINITY;
        }

        let min_delta = self.final_handful_deltas[0];
        let delta_range = self.final_handful_deltas[self.final_handful_deltas.len() - 1] - min_delta;
        if delta_range < PEAK_DELTA_EPSILON {
            return self.final_handful[0];
        }

        let score = |candidate: usize, delta: f32| {
            samples[candidate].to_f32_lossy().abs() * (1.0 - (delta - min_delta) / delta_range)
        };

        let mut chosen_peak = self.final_handful[0];
        let mut best_score = score(chosen_peak, min_delta);
        for (candidate, delta) in self.final_handful.iter().zip(self.final_handful_deltas.iter()).skip(1) {
            let candidate_score = score(*candidate, *delta);
            if candidate_score > best_score {
                best_score = candidate_score;
                chosen_peak = *candidate;
            }
        }
        chosen_peak
    }
}

fn distance(a: usize, b: usize) -> usize {
    if a > b {
        a - b
    } else {
        b - a
    }
}

/// Returns the candidate with the largest absolute sample value, the first one on ties.
fn loudest_candidate<S: Sample>(candidates: &[usize], samples: &[S]) -> usize {
    let mut loudest = candidates[0];
    let mut loudest_level = samples[loudest].abs();
    for candidate in candidates.iter().skip(1) {
        let level = samples[*candidate].abs();
        if level > loudest_level {
            loudest_level = level;
            loudest = *candidate;
        }
    }
    loudest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_impulse_train(sample_count: usize, period: usize, offset: usize, amplitude: f32) -> Vec<f32> {
        let mut samples = vec![0.0; sample_count];
        let mut index = offset;
        while index < sample_count {
            samples[index] = amplitude;
            index += period;
        }
        samples
    }

    fn assert_ascending_with_spacing(peaks: &[usize], min_spacing: usize, max_spacing: usize) {
        assert!(peaks.len() > 1);
        for pair in peaks.windows(2) {
            let spacing = pair[1] - pair[0];
            assert!(
                spacing >= min_spacing && spacing <= max_spacing,
                "Unexpected peak spacing {} between {} and {}",
                spacing,
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_search_order() {
        let mut finder = PeakFinder::new(64);
        finder.sort_search_order(10, 15, 12);
        assert_eq!(finder.search_order, [12, 13, 11, 14, 10]);

        finder.sort_search_order(10, 15, 14);
        assert_eq!(finder.search_order, [14, 13, 12, 11, 10]);

        finder.sort_search_order(10, 15, 10);
        assert_eq!(finder.search_order, [10, 11, 12, 13, 14]);
    }

    #[test]
    fn test_impulse_train() {
        let period = 100;
        let offset = 30;
        let samples = generate_impulse_train(2048, period, offset, 1.0);
        let mut finder = PeakFinder::new(2048);
        let peaks = finder.find_peaks(&samples, period);
        assert_eq!(peaks[0], offset);
        assert_ascending_with_spacing(peaks, period - 1, period + 1);
        for peak in peaks.iter() {
            assert_eq!(samples[*peak], 1.0);
        }
    }

    #[test]
    fn test_negative_impulse_train() {
        let period = 147;
        let samples = generate_impulse_train(2048, period, 90, -0.5);
        let mut finder = PeakFinder::new(2048);
        let peaks = finder.find_peaks(&samples, period);
        assert_eq!(peaks[0], 90);
        assert_ascending_with_spacing(peaks, period - 1, period + 1);
    }

    #[test]
    fn test_sine_peaks_are_ascending() {
        let sample_rate = 44100.0;
        let frequency = 220.0;
        let samples: Vec<f64> = (0..2048)
            .map(|i| (2.0 * std::f64::consts::PI * frequency * (i as f64) / sample_rate).sin())
            .collect();
        let period = 200;
        let mut finder = PeakFinder::new(2048);
        let peaks = finder.find_peaks(&samples, period);
        assert_ascending_with_spacing(peaks, period / 2, 2 * period);
        assert!(*peaks.last().unwrap() < samples.len());
    }

    #[test]
    fn test_two_candidates_picks_loudest() {
        // One search round per window, so each window yields at most two candidates
        let mut finder = PeakFinder::with_capacity(300, 1, 5);
        let mut samples = vec![0.0_f32; 300];
        samples[30] = 0.4;
        samples[70] = -0.9;
        samples[170] = 0.5;
        // Close to where the previous peaks predict the third one, but quiet
        samples[275] = 0.3;
        samples[225] = -0.8;
        let peaks = finder.find_peaks(&samples, 100);
        assert_eq!(peaks, [70, 170, 225]);
    }

    #[test]
    fn test_reuses_storage() {
        let samples = generate_impulse_train(1024, 64, 10, 1.0);
        let mut finder = PeakFinder::new(1024);
        let first_count = finder.find_peaks(&samples, 64).len();
        let second_count = finder.find_peaks(&samples, 64).len();
        assert_eq!(first_count, second_count);
        assert_eq!(finder.peaks().len(), second_count);
    }

    #[test]
    #[should_panic]
    fn test_zero_period() {
        let samples = vec![0.0_f32; 256];
        PeakFinder::new(256).find_peaks(&samples, 0);
    }

    #[test]
    #[should_panic]
    fn test_too_few_samples() {
        let samples = vec![0.0_f32; 150];
        PeakFinder::new(256).find_peaks(&samples, 100);
    }
}
