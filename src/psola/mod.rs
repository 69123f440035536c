//! Pitch synchronous overlap-add (PSOLA) resynthesis.
//!
//! The input is cut into Hann enveloped analysis grains, two periods long and
//! centred on peaks one period apart. The output is built by starting a copy
//! of the most recent analysis grain every desired output period and summing
//! the playing copies. Spacing grains closer together raises the pitch,
//! spacing them further apart lowers it. The spectral envelope of each grain
//! is preserved, so the timbre stays the same.
//!
//! * [PeakFinder] finds grain centres in a frame, given its period.
//! * [GrainStore] holds the analysis grains of the current frame.
//! * [Shifter] plays back grains at the desired period.
//! * [Analyzer] runs pitch detection, peak finding and grain extraction.
//!
//! No memory is allocated after construction, except when changing the
//! sample rate or pitch range.

mod analysis_grain;
mod analyzer;
mod grain_store;
mod peak_finder;
mod shifter;
mod synthesis_grain;

pub use analysis_grain::AnalysisGrain;
pub use analyzer::Analyzer;
pub use grain_store::GrainStore;
pub use peak_finder::PeakFinder;
pub use shifter::Shifter;
