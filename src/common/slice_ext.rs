//! Sample slice extensions.

use super::sample::Sample;

/// Sample slice extensions used by the analysis stages.
pub trait SampleSliceExt<S: Sample> {
    /// Returns the maximum absolute value.
    fn peak_level(&self) -> S;
    /// Scales the slice so that its maximum absolute value is 1.
    /// Returns false, leaving the slice untouched, if all values are zero.
    fn normalize(&mut self) -> bool;
    /// Returns the minimum value and its index, or `None` if the slice is empty.
    /// Ties resolve to the lowest index.
    fn min_and_index(&self) -> Option<(S, usize)>;
    /// Returns the index of the first sample with a different sign than the
    /// first sample, or 0 if there is no such sample.
    fn samples_to_first_zero_crossing(&self) -> usize;
}

impl<S: Sample> SampleSliceExt<S> for [S] {
    fn peak_level(&self) -> S {
        let mut max = S::zero();
        for sample in self.iter() {
            let value = sample.abs();
            if value > max {
                max = value
            }
        }
        max
    }

    fn normalize(&mut self) -> bool {
        let peak = self.peak_level();
        if peak <= S::epsilon() {
            return false;
        }
        let scale = S::one() / peak;
        for sample in self.iter_mut() {
            *sample = *sample * scale;
        }
        true
    }

    fn min_and_index(&self) -> Option<(S, usize)> {
        let mut iter = self.iter().enumerate();
        let (_, first) = iter.next()?;
        let mut min = *first;
        let mut min_index = 0;
        for (index, value) in iter {
            if *value < min {
                min = *value;
                min_index = index;
            }
        }
        Some((min, min_index))
    }

    fn samples_to_first_zero_crossing(&self) -> usize {
        let started_positive = match self.first() {
            Some(first) => *first > S::zero(),
            None => return 0,
        };
        for (index, sample) in self.iter().enumerate().skip(1) {
            if started_positive != (*sample > S::zero()) {
                return index;
            }
        }
        0
    }
}
