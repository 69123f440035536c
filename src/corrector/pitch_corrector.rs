use tracing::debug;

use crate::asdf::PitchEstimate;
use crate::common::Sample;
use crate::config::PsolaConfig;
use crate::corrector::telemetry::{PitchReading, TelemetrySender};
use crate::corrector::tuning::{EqualTemperament, PitchMapping};
use crate::psola::{Analyzer, Shifter};

/// Snaps the pitch of monophonic input to the nearest note of a tuning.
///
/// The detected frequency is converted to a pitch number using the input
/// mapping and rounded to the nearest integer. The output mapping gives the
/// frequency of the rounded pitch, which the input is resynthesized at.
/// Using different mappings allows retuning to another scale, or
/// transposing the output.
pub struct PitchCorrector<S: Sample, I: PitchMapping = EqualTemperament, O: PitchMapping = I> {
    analyzer: Analyzer<S>,
    shifter: Shifter<S>,
    input_mapping: I,
    output_mapping: O,
    corrected_pitch: i32,
    cents_sharp: i32,
    /// The frequency the output is currently shifted to, or 0 if no voiced frame has been seen.
    target_frequency: f32,
    telemetry_sender: Option<TelemetrySender>,
}

impl<S: Sample> PitchCorrector<S> {
    /// Creates a corrector snapping to 12 tone equal temperament with A4 at 440 Hz.
    pub fn new(config: PsolaConfig) -> Self {
        PitchCorrector::with_mappings(config, EqualTemperament::default(), EqualTemperament::default())
    }
}

impl<S: Sample, I: PitchMapping, O: PitchMapping> PitchCorrector<S, I, O> {
    pub fn with_mappings(config: PsolaConfig, input_mapping: I, output_mapping: O) -> Self {
        let analyzer = Analyzer::new(config);
        let (_, max_period) = config.period_range();
        PitchCorrector {
            analyzer,
            shifter: Shifter::new(max_period),
            input_mapping,
            output_mapping,
            corrected_pitch: 0,
            cents_sharp: 0,
            target_frequency: 0.0,
            telemetry_sender: None,
        }
    }

    /// Reallocates all buffers for a new configuration and forgets all state.
    /// Must not be called from the real time thread.
    pub fn prepare(&mut self, config: PsolaConfig) {
        let (_, max_period) = config.period_range();
        self.analyzer = Analyzer::new(config);
        self.shifter = Shifter::new(max_period);
        self.corrected_pitch = 0;
        self.cents_sharp = 0;
        self.target_frequency = 0.0;
        debug!(sample_rate = config.sample_rate, max_period, "prepared pitch corrector");
    }

    /// Analyzes a frame of input. Call `process_next_frame` to render the
    /// corresponding output.
    pub fn analyze_input(&mut self, input: &[S]) -> PitchEstimate {
        self.analyzer.analyze_input(input)
    }

    /// Renders the output for the most recently analyzed frame. `output`
    /// should have the same length as that frame.
    pub fn process_next_frame(&mut self, output: &mut [S]) {
        let estimate = *self.analyzer.estimate();
        if estimate.is_voiced() {
            let pitch = self.input_mapping.pitch_for_frequency(estimate.frequency);
            let rounded_pitch = pitch.round();
            let target_frequency = self.output_mapping.frequency_for_pitch(rounded_pitch);
            self.corrected_pitch = rounded_pitch as i32;
            self.cents_sharp = ((pitch - rounded_pitch) * 100.0).round() as i32;
            if target_frequency > 0.0 && target_frequency.is_finite() {
                self.target_frequency = target_frequency;
                self.shifter.set_pitch(target_frequency, self.analyzer.config().sample_rate);
            }
        }
        // Unvoiced frames keep the previous target

        self.shifter.get_samples(self.analyzer.store(), output);

        if let Some(sender) = self.telemetry_sender.as_mut() {
            sender.send(PitchReading {
                frequency: estimate.frequency,
                voiced: estimate.voiced,
                corrected_pitch: self.corrected_pitch,
                cents_sharp: self.cents_sharp,
            });
        }
    }

    /// Analyzes `input` and writes the corrected frame to `output`.
    pub fn process(&mut self, input: &[S], output: &mut [S]) {
        if input.len() != output.len() {
            panic!(
                "Input and output must have the same length, got {} and {}",
                input.len(),
                output.len()
            )
        }
        self.analyze_input(input);
        self.process_next_frame(output);
    }

    /// Attaches the sender end of a telemetry channel. A reading is sent for every processed frame.
    pub fn set_telemetry_sender(&mut self, sender: TelemetrySender) {
        self.telemetry_sender = Some(sender);
    }

    pub fn take_telemetry_sender(&mut self) -> Option<TelemetrySender> {
        self.telemetry_sender.take()
    }

    /// The pitch number of the note the most recent voiced frame was corrected to.
    pub fn corrected_pitch(&self) -> i32 {
        self.corrected_pitch
    }

    /// How far above the corrected pitch the most recent voiced frame was, in cents.
    pub fn cents_sharp(&self) -> i32 {
        self.cents_sharp
    }

    /// The detected frequency of the most recently analyzed frame, or 0 if it was unvoiced.
    pub fn frequency(&self) -> f32 {
        self.analyzer.frequency()
    }

    pub fn is_voiced(&self) -> bool {
        self.analyzer.estimate().is_voiced()
    }

    pub fn target_frequency(&self) -> f32 {
        self.target_frequency
    }

    /// The number of samples a frame must contain.
    pub fn latency_samples(&self) -> usize {
        self.analyzer.latency_samples()
    }

    pub fn active_grain_count(&self) -> usize {
        self.shifter.active_grain_count()
    }

    pub fn input_mapping(&self) -> &I {
        &self.input_mapping
    }

    pub fn output_mapping(&self) -> &O {
        &self.output_mapping
    }

    /// Replaces the output mapping. Takes effect at the next voiced frame.
    pub fn set_output_mapping(&mut self, output_mapping: O) {
        self.output_mapping = output_mapping;
    }

    pub fn sample_rate(&self) -> f32 {
        self.analyzer.config().sample_rate
    }

    /// Changes the sample rate. Reallocates buffers, so must not be called
    /// from the real time thread.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.analyzer.set_sample_rate(sample_rate);
        self.reallocate_shifter();
        debug!(sample_rate, "pitch corrector sample rate changed");
    }

    /// Changes the detectable pitch range. Reallocates buffers, so must not
    /// be called from the real time thread.
    pub fn set_hz_range(&mut self, min_hz: f32, max_hz: f32) {
        self.analyzer.set_hz_range(min_hz, max_hz);
        self.reallocate_shifter();
    }

    /// Forgets all state, for use on stream discontinuities.
    pub fn reset(&mut self) {
        self.analyzer.reset();
        self.shifter.reset();
    }

    fn reallocate_shifter(&mut self) {
        let (_, max_period) = self.analyzer.config().period_range();
        self.shifter = Shifter::new(max_period);
        if self.target_frequency > 0.0 {
            self.shifter.set_pitch(self.target_frequency, self.sample_rate());
        }
    }
}
