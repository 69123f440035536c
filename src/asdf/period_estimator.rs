use tracing::{debug, warn};

use crate::asdf::period_candidates::PeriodCandidates;
use crate::asdf::pitch_estimate::{parabolic_offset, PitchEstimate};
use crate::common::{Sample, SampleSliceExt};
use crate::config::{period_range, PsolaConfig};

/// Estimates the fundamental period of one frame at a time using the
/// average squared difference function (ASDF).
///
/// The estimator keeps the period of the previous voiced frame as a
/// continuity prior, which restricts the lag search of the next frame
/// to between half and twice that period.
pub struct PeriodEstimator<S: Sample> {
    /// The audio sample rate in Hz.
    sample_rate: f32,
    min_hz: f32,
    max_hz: f32,
    min_period: usize,
    max_period: usize,
    /// Frames with a normalized ASDF minimum above this value are unvoiced.
    confidence_threshold: f32,
    octave_tolerance: f32,
    /// The continuity prior. Only meaningful if `last_frame_was_voiced` is true.
    last_period: usize,
    last_frame_was_voiced: bool,
    /// One value per candidate lag. Index 0 corresponds to the smallest lag of the current frame.
    asdf: Box<[S]>,
    candidates: PeriodCandidates<S>,
    estimate: PitchEstimate,
}

impl<S: Sample> PeriodEstimator<S> {
    pub fn new(sample_rate: f32, min_hz: f32, max_hz: f32) -> Self {
        PeriodEstimator::from_config(&PsolaConfig {
            sample_rate,
            min_hz,
            max_hz,
            max_frame_size: 2 * period_range(sample_rate, min_hz, max_hz).1,
            ..PsolaConfig::default()
        })
    }

    pub fn from_config(config: &PsolaConfig) -> Self {
        config.assert_valid();
        let (min_period, max_period) = config.period_range();
        PeriodEstimator {
            sample_rate: config.sample_rate,
            min_hz: config.min_hz,
            max_hz: config.max_hz,
            min_period,
            max_period,
            confidence_threshold: config.confidence_threshold,
            octave_tolerance: config.octave_tolerance,
            last_period: 0,
            last_frame_was_voiced: false,
            asdf: vec![S::zero(); max_period - min_period + 1].into_boxed_slice(),
            candidates: PeriodCandidates::new(config.period_candidate_count),
            estimate: PitchEstimate::unvoiced(),
        }
    }

    /// Estimates the pitch of a frame. The frame must contain at least
    /// twice the max period number of samples.
    pub fn estimate(&mut self, frame: &[S]) -> PitchEstimate {
        if frame.is_empty() {
            panic!("Cannot estimate the pitch of an empty frame")
        }
        if frame.len() < 2 * self.max_period {
            panic!(
                "Got a frame of {} samples, expected at least {}",
                frame.len(),
                2 * self.max_period
            )
        }

        let (min_lag, max_lag) = self.lag_range(frame);
        let lag_count = max_lag - min_lag + 1;
        let asdf = &mut self.asdf[..lag_count];
        compute_asdf(frame, min_lag, asdf);

        if !asdf.normalize() {
            // Digital silence, nothing periodic about it.
            self.set_unvoiced();
            return self.estimate;
        }

        let (global_min, global_min_index) = match asdf.min_and_index() {
            Some(min) => min,
            None => {
                self.set_unvoiced();
                return self.estimate;
            }
        };

        if global_min.to_f32_lossy() > self.confidence_threshold {
            self.set_unvoiced();
            return self.estimate;
        }

        let raw_index = shortest_lag_minimum(
            asdf,
            global_min_index,
            global_min + S::from_f32_lossy(self.octave_tolerance),
        );

        let index = if self.last_frame_was_voiced {
            self.candidates
                .choose(asdf, min_lag, raw_index, self.last_period)
        } else {
            raw_index
        };

        let period = index + min_lag;
        debug_assert!(period <= self.max_period);
        let fractional_period = period as f32 + parabolic_offset(asdf, index);

        self.last_period = period;
        self.last_frame_was_voiced = true;
        self.estimate = PitchEstimate {
            frequency: self.sample_rate / fractional_period,
            period,
            fractional_period,
            asdf_value: asdf[index].to_f32_lossy(),
            voiced: true,
        };
        self.estimate
    }

    /// The range of lags to search in a given frame, narrowed from the
    /// legal period range by the first zero crossing and the continuity prior.
    fn lag_range(&self, frame: &[S]) -> (usize, usize) {
        // The period can't be shorter than the distance to the first zero crossing.
        let mut min_lag = frame.samples_to_first_zero_crossing();
        let mut max_lag = frame.len() / 2;

        // The pitch shouldn't halve or double between consecutive voiced frames.
        if self.last_frame_was_voiced {
            min_lag = min_lag.max((self.last_period + 1) / 2);
            max_lag = max_lag.min(2 * self.last_period);
        }

        min_lag = min_lag.max(self.min_period);
        max_lag = max_lag.min(self.max_period);

        if max_lag <= min_lag {
            min_lag = (max_lag - 1).min(self.min_period);
        }

        (min_lag, max_lag)
    }

    fn set_unvoiced(&mut self) {
        self.last_frame_was_voiced = false;
        self.estimate = PitchEstimate::unvoiced();
    }

    /// Forgets the continuity prior. Call on stream discontinuities.
    pub fn reset(&mut self) {
        self.set_unvoiced();
        self.last_period = 0;
    }

    /// Sets the sample rate in Hz, rescaling the continuity prior.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        if !(sample_rate > 0.0) {
            panic!("Sample rate must be greater than 0, got {}", sample_rate)
        }
        if self.last_frame_was_voiced {
            let last_frequency = self.sample_rate / self.last_period as f32;
            self.last_period = ((sample_rate / last_frequency).round() as usize).max(1);
        }
        debug!(from = self.sample_rate, to = sample_rate, "period estimator sample rate changed");
        self.sample_rate = sample_rate;
        self.set_hz_range(self.min_hz, self.max_hz);
    }

    /// Sets the detectable pitch range in Hz, reallocating the ASDF buffer if needed.
    pub fn set_hz_range(&mut self, min_hz: f32, max_hz: f32) {
        if !(min_hz > 0.0) || !(max_hz > min_hz) {
            panic!("Invalid pitch range [{}, {}] Hz", min_hz, max_hz)
        }
        self.min_hz = min_hz;
        self.max_hz = max_hz;
        let (min_period, max_period) = period_range(self.sample_rate, min_hz, max_hz);
        if (self.sample_rate / max_hz).round() < 1.0 {
            warn!(max_hz, sample_rate = self.sample_rate, "max Hz above sample rate, clamping min period to 1");
        }
        self.min_period = min_period;
        self.max_period = max_period;

        let lag_count = max_period - min_period + 1;
        if self.asdf.len() != lag_count {
            self.asdf = vec![S::zero(); lag_count].into_boxed_slice();
        }
        debug!(min_period, max_period, "period estimator range changed");
    }

    pub fn set_confidence_threshold(&mut self, confidence_threshold: f32) {
        self.confidence_threshold = confidence_threshold;
    }

    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    /// Returns the legal period range `(min_period, max_period)` in samples.
    pub fn legal_period_range(&self) -> (usize, usize) {
        (self.min_period, self.max_period)
    }

    /// The minimum number of samples a frame must contain, i.e the
    /// latency introduced by collecting a frame.
    pub fn latency_samples(&self) -> usize {
        2 * self.max_period
    }

    /// Returns the most recent estimate.
    pub fn last_estimate(&self) -> &PitchEstimate {
        &self.estimate
    }

    /// Returns the current sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

/// Computes the ASDF for lags `min_lag..min_lag + asdf.len()`.
///
/// The frame is split in two halves. For every offset into the first half,
/// the squared difference between a sample and the sample `k` steps later is
/// added to the squared difference between the matching sample in the second
/// half and the sample `k` steps before it. The two terms are squared
/// separately, so they can't cancel each other out at lags that are not
/// multiples of the period.
fn compute_asdf<S: Sample>(frame: &[S], min_lag: usize, asdf: &mut [S]) {
    let half = frame.len() / 2;
    for (index, value) in asdf.iter_mut().enumerate() {
        let k = min_lag + index;
        let mut sum = S::zero();
        for s1 in 0..half {
            let s2 = half + s1;
            let later = frame[s1] - frame[s1 + k];
            let earlier = frame[s2 - k] - frame[s2];
            sum = sum + later * later + earlier * earlier;
        }
        *value = sum;
    }
}

/// Returns the index of the first local minimum not exceeding `limit`,
/// falling back to `global_min_index`. Keeps a near perfect minimum at
/// a multiple of the period from beating the period itself.
fn shortest_lag_minimum<S: Sample>(asdf: &[S], global_min_index: usize, limit: S) -> usize {
    for index in 0..global_min_index {
        let value = asdf[index];
        let is_local_min = (index == 0 || value <= asdf[index - 1]) && value <= asdf[index + 1];
        if is_local_min && value <= limit {
            return index;
        }
    }
    global_min_index
}
