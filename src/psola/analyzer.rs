use tracing::debug;

use crate::asdf::{PeriodEstimator, PitchEstimate};
use crate::common::Sample;
use crate::config::PsolaConfig;
use crate::psola::grain_store::GrainStore;
use crate::psola::peak_finder::PeakFinder;

/// Runs the analysis half of the pipeline on one frame at a time: pitch
/// estimation, peak finding and grain extraction.
pub struct Analyzer<S: Sample> {
    config: PsolaConfig,
    estimator: PeriodEstimator<S>,
    peak_finder: PeakFinder,
    store: GrainStore<S>,
    /// The estimate of the most recently analyzed frame.
    estimate: PitchEstimate,
}

impl<S: Sample> Analyzer<S> {
    pub fn new(config: PsolaConfig) -> Self {
        config.assert_valid();
        let (min_period, max_period) = config.period_range();
        Analyzer {
            config,
            estimator: PeriodEstimator::from_config(&config),
            peak_finder: PeakFinder::from_config(&config),
            store: GrainStore::new(
                GrainStore::<S>::slot_count_for(config.max_frame_size, min_period),
                max_period,
            ),
            estimate: PitchEstimate::unvoiced(),
        }
    }

    /// Analyzes a frame, replacing the grains of the previous frame. The frame
    /// must contain between twice the max period and `max_frame_size` samples.
    pub fn analyze_input(&mut self, frame: &[S]) -> PitchEstimate {
        if frame.len() > self.config.max_frame_size {
            panic!(
                "Got a frame of {} samples, the max frame size is {}",
                frame.len(),
                self.config.max_frame_size
            )
        }

        let estimate = self.estimator.estimate(frame);
        if estimate.is_voiced() {
            self.store.begin_frame(frame.len());
            let period = estimate.period;
            for peak in self.peak_finder.find_peaks(frame, period) {
                self.store.extract(frame, *peak, period);
            }
        } else {
            self.store.clear();
        }

        self.estimate = estimate;
        estimate
    }

    /// The estimate of the most recently analyzed frame.
    pub fn estimate(&self) -> &PitchEstimate {
        &self.estimate
    }

    /// The detected frequency of the most recently analyzed frame, or 0 if it was unvoiced.
    pub fn frequency(&self) -> f32 {
        self.estimate.frequency
    }

    pub fn store(&self) -> &GrainStore<S> {
        &self.store
    }

    pub fn peak_finder(&self) -> &PeakFinder {
        &self.peak_finder
    }

    pub fn estimator(&self) -> &PeriodEstimator<S> {
        &self.estimator
    }

    pub fn config(&self) -> &PsolaConfig {
        &self.config
    }

    /// The number of samples a frame must contain.
    pub fn latency_samples(&self) -> usize {
        self.estimator.latency_samples()
    }

    /// Changes the sample rate, keeping the continuity prior.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        let config = self.config.with_sample_rate(sample_rate);
        config.assert_valid();
        self.config = config;
        self.estimator.set_sample_rate(sample_rate);
        self.resize_store();
    }

    /// Changes the detectable pitch range.
    pub fn set_hz_range(&mut self, min_hz: f32, max_hz: f32) {
        let config = self.config.with_hz_range(min_hz, max_hz);
        config.assert_valid();
        self.config = config;
        self.estimator.set_hz_range(min_hz, max_hz);
        self.resize_store();
    }

    /// Forgets all state, for use on stream discontinuities.
    pub fn reset(&mut self) {
        self.estimator.reset();
        self.store.clear();
        self.estimate = PitchEstimate::unvoiced();
    }

    fn resize_store(&mut self) {
        let (min_period, max_period) = self.config.period_range();
        let slot_count = GrainStore::<S>::slot_count_for(self.config.max_frame_size, min_period);
        self.store = GrainStore::new(slot_count, max_period);
        debug!(slot_count, max_period, "reallocated grain store");
    }
}
