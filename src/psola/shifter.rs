use tracing::debug;

use crate::common::Sample;
use crate::psola::grain_store::GrainStore;
use crate::psola::synthesis_grain::{GrainState, SynthesisGrain};

/// The number of synthesis grains that may play at the same time.
const SYNTHESIS_GRAIN_COUNT: usize = 2;

/// Resynthesizes audio at a new pitch by starting a copy of the most recent
/// analysis grain every desired output period and overlap-adding the
/// playing copies.
pub struct Shifter<S: Sample> {
    grains: Vec<SynthesisGrain<S>>,
    /// The number of output samples between grain starts.
    desired_period: usize,
    /// Output samples left until the next grain starts.
    samples_to_next_grain: usize,
    /// The number of output samples produced so far.
    tick: u64,
}

impl<S: Sample> Shifter<S> {
    pub fn new(max_period: usize) -> Self {
        let mut grains = Vec::with_capacity(SYNTHESIS_GRAIN_COUNT);
        for _ in 0..SYNTHESIS_GRAIN_COUNT {
            grains.push(SynthesisGrain::new(max_period));
        }
        Shifter {
            grains,
            desired_period: max_period.max(1),
            samples_to_next_grain: 0,
            tick: 0,
        }
    }

    /// Sets the output pitch. The new period takes effect the next time a grain starts.
    pub fn set_pitch(&mut self, target_hz: f32, sample_rate: f32) {
        if !(target_hz > 0.0) {
            panic!("Target frequency must be greater than 0, got {}", target_hz)
        }
        self.set_period(((sample_rate / target_hz).round() as usize).max(1));
    }

    /// Sets the output period in samples directly.
    pub fn set_period(&mut self, desired_period: usize) {
        if desired_period == 0 {
            panic!("Desired period must be greater than 0")
        }
        self.desired_period = desired_period;
    }

    pub fn desired_period(&self) -> usize {
        self.desired_period
    }

    /// Fills `output` with resynthesized samples. Output sample `i` lines up
    /// with sample `i` of the frame the grains in `store` were extracted from.
    /// Produces silence while no grain is available.
    pub fn get_samples(&mut self, store: &GrainStore<S>, output: &mut [S]) {
        for (index, value) in output.iter_mut().enumerate() {
            if self.samples_to_next_grain == 0 {
                if let Some(source) = store.most_recent_at(index as isize) {
                    let slot = self.slot_for_new_grain();
                    self.grains[slot].start(source, self.tick);
                    self.samples_to_next_grain = self.desired_period;
                }
            }

            let mut sum = S::zero();
            for grain in self.grains.iter_mut() {
                if grain.is_active() {
                    sum = sum + grain.next_sample();
                }
                if grain.state() == GrainState::Exhausted {
                    grain.recycle();
                }
            }
            *value = sum;

            if self.samples_to_next_grain > 0 {
                self.samples_to_next_grain -= 1;
            }
            self.tick += 1;
        }
    }

    /// An idle grain if there is one, otherwise the oldest active grain,
    /// which is superseded.
    ///
    /// A superseded grain stops without fading out, after playing two desired
    /// periods. Whenever the pitch is shifted up, that is before the end of
    /// its envelope. An octave up it is cut at the envelope peak, which can
    /// leave an audible discontinuity in the output.
    fn slot_for_new_grain(&self) -> usize {
        let mut oldest_slot = 0;
        for (slot, grain) in self.grains.iter().enumerate() {
            if !grain.is_active() {
                return slot;
            }
            if grain.start_tick() < self.grains[oldest_slot].start_tick() {
                oldest_slot = slot;
            }
        }
        oldest_slot
    }

    /// The number of grains currently playing.
    pub fn active_grain_count(&self) -> usize {
        self.grains.iter().filter(|grain| grain.is_active()).count()
    }

    /// Stops all grains.
    pub fn reset(&mut self) {
        for grain in self.grains.iter_mut() {
            grain.recycle();
        }
        self.samples_to_next_grain = 0;
        debug!("shifter reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_sine(period: f32, sample_count: usize) -> Vec<f32> {
        (0..sample_count)
            .map(|i| (2.0 * core::f32::consts::PI * (i as f32) / period).sin())
            .collect()
    }

    /// A store with grains of `period` samples centred on each crest of a sine.
    fn sine_store(period: usize, frame: &[f32]) -> GrainStore<f32> {
        let mut store = GrainStore::new(GrainStore::<f32>::slot_count_for(frame.len(), period), period);
        let mut centre = period / 4;
        while centre < frame.len() {
            store.extract(frame, centre, period);
            centre += period;
        }
        store
    }

    /// The lag in `[min_lag, max_lag]` with the smallest mean squared difference.
    fn best_lag(signal: &[f32], min_lag: usize, max_lag: usize) -> usize {
        let mut best = (f32::MAX, min_lag);
        for lag in min_lag..=max_lag {
            let count = signal.len() - lag;
            let difference: f32 = (0..count)
                .map(|i| (signal[i] - signal[i + lag]) * (signal[i] - signal[i + lag]))
                .sum::<f32>()
                / count as f32;
            if difference < best.0 {
                best = (difference, lag);
            }
        }
        best.1
    }

    #[test]
    fn test_silence_without_grains() {
        let store = GrainStore::<f32>::new(4, 100);
        let mut shifter = Shifter::new(100);
        shifter.set_period(50);
        let mut output = vec![1.0_f32; 256];
        shifter.get_samples(&store, &mut output);
        assert!(output.iter().all(|value| *value == 0.0));
        assert_eq!(shifter.active_grain_count(), 0);
    }

    #[test]
    fn test_at_most_two_active_grains() {
        let period = 100;
        let frame = generate_sine(period as f32, 2048);
        let mut store = sine_store(period, &frame);
        // Carry over the last grain, so that it's available at every output index
        store.begin_frame(frame.len());

        for desired_period in [20, 37, 100, 150, 300].iter() {
            let mut shifter = Shifter::new(period);
            shifter.set_period(*desired_period);
            let mut output = [0.0_f32; 1];
            let mut max_active_count = 0;
            for _ in 0..frame.len() {
                shifter.get_samples(&store, &mut output);
                let active_count = shifter.active_grain_count();
                assert!(active_count <= 2);
                max_active_count = max_active_count.max(active_count);
            }
            let expected_max = if *desired_period < 2 * period { 2 } else { 1 };
            assert_eq!(max_active_count, expected_max, "desired period {}", desired_period);
        }
    }

    #[test]
    fn test_round_trip_keeps_period() {
        let period = 120;
        let frame = generate_sine(period as f32, 2048);
        let store = sine_store(period, &frame);
        let mut shifter = Shifter::new(period);
        shifter.set_period(period);
        let mut output = vec![0.0_f32; frame.len()];
        shifter.get_samples(&store, &mut output);

        // Skip the start, where no grain is available yet
        let lag = best_lag(&output[512..], 80, 180);
        assert!((lag as isize - period as isize).abs() <= 1, "lag {}", lag);
    }

    #[test]
    fn test_shift_up() {
        let period = 120;
        let frame = generate_sine(period as f32, 2048);
        let store = sine_store(period, &frame);
        let mut shifter = Shifter::new(period);
        shifter.set_pitch(44100.0 / 80.0, 44100.0);
        assert_eq!(shifter.desired_period(), 80);
        let mut output = vec![0.0_f32; frame.len()];
        shifter.get_samples(&store, &mut output);
        assert!(output[512..].iter().any(|value| value.abs() > 0.1));
        let lag = best_lag(&output[512..], 50, 110);
        assert!((lag as isize - 80).abs() <= 1, "lag {}", lag);
    }

    #[test]
    fn test_period_change_applies_at_next_trigger() {
        let period = 100;
        let frame = generate_sine(period as f32, 1024);
        let mut store = sine_store(period, &frame);
        store.begin_frame(frame.len());

        let mut shifter = Shifter::new(period);
        shifter.set_period(100);
        let mut output = [0.0_f32; 1];
        let mut start_ticks = Vec::new();
        for block in 0..2 {
            if block == 1 {
                shifter.set_period(60);
            }
            for _ in 0..250 {
                let tick = shifter.tick;
                shifter.get_samples(&store, &mut output);
                if shifter.grains.iter().any(|grain| grain.is_active() && grain.start_tick() == tick) {
                    start_ticks.push(tick);
                }
            }
        }
        // The grain due at 300 was scheduled before the change
        assert_eq!(start_ticks, [0, 100, 200, 300, 360, 420, 480]);
    }

    #[test]
    fn test_reset_stops_grains() {
        let period = 100;
        let frame = generate_sine(period as f32, 1024);
        let store = sine_store(period, &frame);
        let mut shifter = Shifter::new(period);
        shifter.set_period(100);
        let mut output = vec![0.0_f32; 200];
        shifter.get_samples(&store, &mut output);
        assert!(shifter.active_grain_count() > 0);
        shifter.set_period(60);
        assert_eq!(shifter.desired_period(), 60);
        shifter.reset();
        assert_eq!(shifter.active_grain_count(), 0);
    }

    #[test]
    #[should_panic]
    fn test_zero_target_frequency() {
        Shifter::<f32>::new(100).set_pitch(0.0, 44100.0);
    }
}
