//! Common algorithms and utilities.

mod midi;
mod sample;
mod slice_ext;
mod window_function;

pub use midi::{freq_to_midi_note, midi_note_to_freq};
pub use sample::Sample;
pub use slice_ext::SampleSliceExt;
pub use window_function::hann_window;
