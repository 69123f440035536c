use crate::common::{freq_to_midi_note, midi_note_to_freq};

/// Maps between frequencies and (fractional) pitch numbers.
pub trait PitchMapping {
    /// Returns the pitch number of a frequency in Hz. Integer pitch numbers
    /// correspond to the notes of the tuning.
    fn pitch_for_frequency(&self, frequency: f32) -> f32;

    /// Returns the frequency in Hz of a pitch number.
    fn frequency_for_pitch(&self, pitch: f32) -> f32;
}

/// 12 tone equal temperament, with pitch numbers matching MIDI note numbers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EqualTemperament {
    /// The frequency of A4 (MIDI note 69) in Hz.
    pub concert_pitch_hz: f32,
}

impl EqualTemperament {
    pub fn new(concert_pitch_hz: f32) -> Self {
        if !(concert_pitch_hz > 0.0) {
            panic!("Concert pitch must be greater than 0, got {}", concert_pitch_hz)
        }
        EqualTemperament { concert_pitch_hz }
    }
}

impl Default for EqualTemperament {
    fn default() -> Self {
        EqualTemperament {
            concert_pitch_hz: 440.0,
        }
    }
}

impl PitchMapping for EqualTemperament {
    fn pitch_for_frequency(&self, frequency: f32) -> f32 {
        freq_to_midi_note(frequency * 440.0 / self.concert_pitch_hz)
    }

    fn frequency_for_pitch(&self, pitch: f32) -> f32 {
        midi_note_to_freq(pitch, self.concert_pitch_hz)
    }
}

/// Equal division of the octave into an arbitrary number of steps, for
/// microtonal tunings. Pitch numbers count steps from a reference pitch.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EdoTuning {
    divisions: f32,
    reference_pitch: f32,
    reference_frequency: f32,
}

impl EdoTuning {
    /// Creates a tuning with `divisions` steps per octave, where
    /// `reference_pitch` sounds at `reference_frequency` Hz.
    pub fn new(divisions: u32, reference_pitch: f32, reference_frequency: f32) -> Self {
        if divisions == 0 {
            panic!("An octave must be divided into at least one step")
        }
        if !(reference_frequency > 0.0) {
            panic!("Reference frequency must be greater than 0, got {}", reference_frequency)
        }
        EdoTuning {
            divisions: divisions as f32,
            reference_pitch,
            reference_frequency,
        }
    }

    pub fn divisions(&self) -> u32 {
        self.divisions as u32
    }
}

impl PitchMapping for EdoTuning {
    fn pitch_for_frequency(&self, frequency: f32) -> f32 {
        self.reference_pitch + self.divisions * (frequency / self.reference_frequency).log2()
    }

    fn frequency_for_pitch(&self, pitch: f32) -> f32 {
        self.reference_frequency * (2.0_f32).powf((pitch - self.reference_pitch) / self.divisions)
    }
}
