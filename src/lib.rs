//! Real time pitch detection and pitch shifting of monophonic audio.
//!
//! * [PeriodEstimator] estimates the fundamental frequency of a frame using
//!   the average squared difference function (ASDF), see [asdf].
//! * [psola] changes the pitch of the input by pitch synchronous overlap-add
//!   (PSOLA) resynthesis, preserving timbre and timing.
//! * [PitchCorrector] ties the two together, snapping the pitch of the input
//!   to the nearest note of a tuning.
//!
//! Features
//! * Generic over `f32` and `f64` samples.
//! * No allocations after initialization, suitable for real time audio use.
//! * Pitch readings can be passed to other threads through a lock free
//!   ring buffer, see [telemetry_channel].
//!
//! The processors work on frames of a fixed size. A frame must contain at
//! least twice the longest detectable period, see
//! [PsolaConfig::min_frame_size]. Collecting host buffers of arbitrary size
//! into frames is up to the caller.
//!
//! # Examples
//! Correct a slightly flat A4 and read the detected pitch.
//! ```
//! use micro_psola::{PitchCorrector, PsolaConfig};
//!
//! let config = PsolaConfig::default();
//! let frame_size = config.max_frame_size;
//! let frequency = 436.0;
//! let input: Vec<f32> = (0..frame_size)
//!     .map(|i| (2.0 * core::f32::consts::PI * frequency * (i as f32) / config.sample_rate).sin())
//!     .collect();
//! let mut output = vec![0.0; frame_size];
//!
//! let mut corrector = PitchCorrector::new(config);
//! corrector.process(&input, &mut output);
//!
//! assert!(corrector.is_voiced());
//! // MIDI note 69 is A4
//! assert_eq!(corrector.corrected_pitch(), 69);
//! assert!(corrector.cents_sharp() < 0);
//! assert_eq!(corrector.target_frequency(), 440.0);
//! ```

pub mod asdf;
mod common;
mod config;
mod corrector;
pub mod psola;

pub use asdf::{PeriodEstimator, PitchEstimate};
pub use common::{freq_to_midi_note, midi_note_to_freq, Sample};
pub use config::{period_range, ConfigError, PsolaConfig};
pub use corrector::{
    telemetry_channel, EdoTuning, EqualTemperament, PitchCorrector, PitchMapping, PitchReading,
    TelemetryReceiver, TelemetrySender,
};
