use crate::common::Sample;
use crate::psola::analysis_grain::AnalysisGrain;

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum GrainState {
    /// Available for playback.
    Idle,
    /// Contributing one sample per output tick.
    Active,
    /// Played to the end, waiting to be returned to the idle pool.
    Exhausted,
}

/// A playing copy of an analysis grain.
pub(crate) struct SynthesisGrain<S: Sample> {
    samples: Box<[S]>,
    len: usize,
    position: usize,
    /// The output tick at which playback started, for finding the oldest grain.
    start_tick: u64,
    state: GrainState,
}

impl<S: Sample> SynthesisGrain<S> {
    pub(crate) fn new(max_period: usize) -> Self {
        SynthesisGrain {
            samples: vec![S::zero(); 2 * max_period].into_boxed_slice(),
            len: 0,
            position: 0,
            start_tick: 0,
            state: GrainState::Idle,
        }
    }

    /// Starts playing a copy of `source`, discarding any ongoing playback.
    pub(crate) fn start(&mut self, source: &AnalysisGrain<S>, tick: u64) {
        let source_samples = source.samples();
        let len = source_samples.len().min(self.samples.len());
        self.samples[..len].copy_from_slice(&source_samples[..len]);
        self.len = len;
        self.position = 0;
        self.start_tick = tick;
        self.state = if len > 0 { GrainState::Active } else { GrainState::Idle };
    }

    /// Returns the next sample and advances playback. Must only be called on active grains.
    pub(crate) fn next_sample(&mut self) -> S {
        debug_assert_eq!(self.state, GrainState::Active);
        let value = self.samples[self.position];
        self.position += 1;
        if self.position >= self.len {
            self.state = GrainState::Exhausted;
        }
        value
    }

    /// Returns an exhausted grain to the idle pool.
    pub(crate) fn recycle(&mut self) {
        self.state = GrainState::Idle;
        self.position = 0;
    }

    pub(crate) fn state(&self) -> GrainState {
        self.state
    }

    pub(crate) fn is_active(&self) -> bool {
        self.state == GrainState::Active
    }

    pub(crate) fn start_tick(&self) -> u64 {
        self.start_tick
    }
}
