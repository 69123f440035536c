//! Engine configuration.

use thiserror::Error;

/// Errors reported by [`PsolaConfig::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Sample rate must be greater than 0, got {0}")]
    InvalidSampleRate(f32),
    #[error("Invalid pitch range [{min_hz}, {max_hz}] Hz, expected 0 < min < max")]
    InvalidHzRange { min_hz: f32, max_hz: f32 },
    #[error("Frame size {frame_size} is shorter than twice the max period ({required} samples)")]
    FrameTooShort { frame_size: usize, required: usize },
    #[error("Candidate count '{0}' must be greater than 0")]
    ZeroCandidateCount(&'static str),
    #[error("Confidence threshold must be a finite, non-negative value, got {0}")]
    InvalidConfidenceThreshold(f32),
}

/// Configuration shared by the analysis and resynthesis stages.
///
/// Changing any of these values means reallocating buffers, which
/// must happen outside the real time processing path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PsolaConfig {
    /// The audio sample rate in Hz.
    pub sample_rate: f32,
    /// The lowest detectable pitch in Hz.
    pub min_hz: f32,
    /// The highest detectable pitch in Hz.
    pub max_hz: f32,
    /// The largest frame that will be passed to the engine.
    pub max_frame_size: usize,
    /// Frames whose normalized ASDF minimum is above this value are unvoiced.
    pub confidence_threshold: f32,
    /// Normalized ASDF distance within which a shorter lag is preferred over
    /// the global minimum.
    pub octave_tolerance: f32,
    /// The number of extra period candidates considered when smoothing jitter.
    pub period_candidate_count: usize,
    /// The maximum number of peak candidates gathered per analysis window.
    pub peak_candidate_count: usize,
    /// The number of lowest delta peak candidates kept for the final choice.
    pub final_handful_size: usize,
}

impl Default for PsolaConfig {
    fn default() -> Self {
        PsolaConfig {
            sample_rate: 44100.0,
            min_hz: 80.0,
            max_hz: 1000.0,
            max_frame_size: 2048,
            confidence_threshold: 0.15,
            octave_tolerance: 0.01,
            period_candidate_count: 10,
            peak_candidate_count: 10,
            final_handful_size: 5,
        }
    }
}

/// The legal period range in samples for a given sample rate and pitch range.
/// `min_period` is at least 1 and `max_period` is always greater than `min_period`.
pub fn period_range(sample_rate: f32, min_hz: f32, max_hz: f32) -> (usize, usize) {
    let min_period = ((sample_rate / max_hz).round() as usize).max(1);
    let max_period = ((sample_rate / min_hz).round() as usize).max(min_period + 1);
    (min_period, max_period)
}

impl PsolaConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_hz_range(mut self, min_hz: f32, max_hz: f32) -> Self {
        self.min_hz = min_hz;
        self.max_hz = max_hz;
        self
    }

    pub fn with_max_frame_size(mut self, max_frame_size: usize) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }

    pub fn with_confidence_threshold(mut self, confidence_threshold: f32) -> Self {
        self.confidence_threshold = confidence_threshold;
        self
    }

    /// Returns `(min_period, max_period)` in samples.
    pub fn period_range(&self) -> (usize, usize) {
        period_range(self.sample_rate, self.min_hz, self.max_hz)
    }

    /// The minimum number of samples a frame must contain.
    pub fn min_frame_size(&self) -> usize {
        2 * self.period_range().1
    }

    /// Checks the configuration without panicking.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate > 0.0) || !self.sample_rate.is_finite() {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        if !(self.min_hz > 0.0) || !(self.max_hz > self.min_hz) || !self.max_hz.is_finite() {
            return Err(ConfigError::InvalidHzRange {
                min_hz: self.min_hz,
                max_hz: self.max_hz,
            });
        }
        if !(self.confidence_threshold >= 0.0) || !self.confidence_threshold.is_finite() {
            return Err(ConfigError::InvalidConfidenceThreshold(self.confidence_threshold));
        }
        let required = self.min_frame_size();
        if self.max_frame_size < required {
            return Err(ConfigError::FrameTooShort {
                frame_size: self.max_frame_size,
                required,
            });
        }
        if self.period_candidate_count == 0 {
            return Err(ConfigError::ZeroCandidateCount("period_candidate_count"));
        }
        if self.peak_candidate_count == 0 {
            return Err(ConfigError::ZeroCandidateCount("peak_candidate_count"));
        }
        if self.final_handful_size == 0 {
            return Err(ConfigError::ZeroCandidateCount("final_handful_size"));
        }
        Ok(())
    }

    /// Panics with a descriptive message if the configuration is invalid.
    pub(crate) fn assert_valid(&self) {
        if let Err(error) = self.validate() {
            panic!("{}", error)
        }
    }
}
