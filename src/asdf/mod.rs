//! Pitch detection based on the average squared difference function (ASDF).
//!
//! For each candidate lag `k`, the ASDF measures how much a frame differs
//! from itself shifted by `k` samples. Lags close to the fundamental period
//! (or multiples of it) give values close to zero. The detector
//! * narrows the lag range using the first zero crossing and the period of
//!   the previous voiced frame, so the pitch can't jump more than an octave
//!   between frames.
//! * prefers the shortest lag whose minimum is as good as the best one,
//!   which avoids octave errors.
//! * favors lags close to the previous period when several minima are
//!   similar, which reduces jitter.
//! * refines the integer lag using parabolic interpolation.
//!
//! # Examples
//! ```
//! use micro_psola::PeriodEstimator;
//!
//! let sample_rate = 44100.0;
//! let frequency = 220.0;
//! let frame: Vec<f32> = (0..2048)
//!     .map(|i| (2.0 * core::f32::consts::PI * frequency * (i as f32) / sample_rate).sin())
//!     .collect();
//!
//! let mut estimator = PeriodEstimator::new(sample_rate, 80.0, 1000.0);
//! let estimate = estimator.estimate(&frame);
//! assert!(estimate.voiced);
//! assert!((estimate.frequency - frequency).abs() / frequency <= 0.01);
//! ```

mod period_candidates;
mod period_estimator;
mod pitch_estimate;

pub use period_estimator::PeriodEstimator;
pub use pitch_estimate::PitchEstimate;
