use crate::common::{hann_window, Sample};

/// A Hann enveloped segment of two periods, centred on a peak of the input.
pub struct AnalysisGrain<S: Sample> {
    /// Preallocated to fit a grain of the longest legal period.
    samples: Box<[S]>,
    len: usize,
    /// The position of the centre relative to the start of the current
    /// frame. Negative for a grain carried over from a previous frame.
    centre: isize,
    period: usize,
}

impl<S: Sample> AnalysisGrain<S> {
    pub(crate) fn new(max_period: usize) -> Self {
        AnalysisGrain {
            samples: vec![S::zero(); 2 * max_period].into_boxed_slice(),
            len: 0,
            centre: 0,
            period: 0,
        }
    }

    /// Copies `2 * period` samples centred on `centre` and applies the envelope.
    /// The caller makes sure the grain fits inside `frame`.
    pub(crate) fn fill(&mut self, frame: &[S], centre: usize, period: usize) {
        let len = 2 * period;
        debug_assert!(centre >= period && centre + period <= frame.len());
        debug_assert!(len <= self.samples.len());
        let samples = &mut self.samples[..len];
        samples.copy_from_slice(&frame[(centre - period)..(centre + period)]);
        hann_window(samples);
        self.len = len;
        self.centre = centre as isize;
        self.period = period;
    }

    pub(crate) fn shift_centre(&mut self, offset: isize) {
        self.centre += offset;
    }

    /// The enveloped samples.
    pub fn samples(&self) -> &[S] {
        &self.samples[..self.len]
    }

    pub fn centre(&self) -> isize {
        self.centre
    }

    /// The period the grain was extracted with. The grain is twice this long.
    pub fn period(&self) -> usize {
        self.period
    }

    pub(crate) fn capacity(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill() {
        let frame: Vec<f32> = vec![1.0; 64];
        let mut grain = AnalysisGrain::new(20);
        grain.fill(&frame, 30, 10);
        assert_eq!(grain.samples().len(), 20);
        assert_eq!(grain.centre(), 30);
        assert_eq!(grain.period(), 10);
        // Enveloped, zero at the edges and close to one in the middle
        assert!(grain.samples()[0].abs() < 0.01);
        assert!(grain.samples()[19].abs() < 0.01);
        assert!(grain.samples()[10] > 0.9);

        grain.shift_centre(-64);
        assert_eq!(grain.centre(), -34);
    }
}
