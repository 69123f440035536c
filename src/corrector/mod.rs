//! Pitch correction: snapping the pitch of the input to the notes of a tuning.

mod pitch_corrector;
mod telemetry;
mod tuning;

pub use pitch_corrector::PitchCorrector;
pub use telemetry::{telemetry_channel, PitchReading, TelemetryReceiver, TelemetrySender};
pub use tuning::{EdoTuning, EqualTemperament, PitchMapping};
