use crate::common::{Sample, SampleSliceExt};

/// Scratch storage for the jitter resistant choice between the best
/// ASDF minimum and its runners up. All buffers are allocated up front.
pub(crate) struct PeriodCandidates<S: Sample> {
    /// Indices into the ASDF curve, the raw minimum first.
    indices: Vec<usize>,
    /// Distance in samples from each candidate lag to the previous period.
    deltas: Vec<usize>,
    weighted_asdf: Vec<S>,
    /// The number of candidates to gather in addition to the raw minimum.
    extra_candidate_count: usize,
}

impl<S: Sample> PeriodCandidates<S> {
    pub(crate) fn new(extra_candidate_count: usize) -> Self {
        let capacity = extra_candidate_count + 1;
        PeriodCandidates {
            indices: Vec::with_capacity(capacity),
            deltas: Vec::with_capacity(capacity),
            weighted_asdf: Vec::with_capacity(capacity),
            extra_candidate_count,
        }
    }

    /// Chooses the ASDF index to use as the period of a voiced frame that
    /// follows another voiced frame. Candidates close to `last_period`
    /// get their ASDF values scaled down, which keeps the estimate from
    /// jittering between neighbouring lags.
    pub(crate) fn choose(
        &mut self,
        asdf: &[S],
        min_lag: usize,
        raw_index: usize,
        last_period: usize,
    ) -> usize {
        self.indices.clear();
        self.deltas.clear();
        self.weighted_asdf.clear();

        self.indices.push(raw_index);
        for _ in 0..self.extra_candidate_count {
            if !self.claim_next_best(asdf) {
                break;
            }
        }

        if self.indices.len() <= 2 {
            return raw_index;
        }

        let mut min_delta = usize::MAX;
        let mut max_delta = 0;
        for index in self.indices.iter() {
            let lag = index + min_lag;
            let delta = if lag > last_period {
                lag - last_period
            } else {
                last_period - lag
            };
            min_delta = min_delta.min(delta);
            max_delta = max_delta.max(delta);
            self.deltas.push(delta);
        }

        let delta_range = max_delta - min_delta;
        if delta_range < MIN_DELTA_RANGE {
            return raw_index;
        }

        let delta_range = S::from_usize(delta_range).unwrap_or_else(S::one);
        for (index, delta) in self.indices.iter().zip(self.deltas.iter()) {
            let delta = S::from_usize(*delta).unwrap_or_else(S::zero);
            self.weighted_asdf.push(asdf[*index] * (delta / delta_range));
        }

        match self.weighted_asdf.min_and_index() {
            Some((_, chosen)) => self.indices[chosen],
            None => raw_index,
        }
    }

    /// Adds the index of the smallest ASDF value not already claimed.
    /// Returns false if every index has been claimed.
    fn claim_next_best(&mut self, asdf: &[S]) -> bool {
        let mut best: Option<(usize, S)> = None;
        for (index, value) in asdf.iter().enumerate() {
            if self.indices.contains(&index) {
                continue;
            }
            match best {
                Some((_, best_value)) if *value >= best_value => {}
                _ => best = Some((index, *value)),
            }
        }
        match best {
            Some((index, _)) => {
                self.indices.push(index);
                true
            }
            None => false,
        }
    }
}

/// Candidate delta ranges below this many samples are too narrow to weight by.
const MIN_DELTA_RANGE: usize = 2;
