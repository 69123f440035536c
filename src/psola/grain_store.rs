use crate::common::Sample;
use crate::psola::analysis_grain::AnalysisGrain;

/// Holds the analysis grains of the current frame, plus the most recent
/// grain of the previous frame.
///
/// Grains live in a fixed set of slots allocated up front. Free slots are
/// tracked in a free list and occupied slots in arrival order, which is
/// also ascending centre order.
pub struct GrainStore<S: Sample> {
    slots: Vec<AnalysisGrain<S>>,
    free_slots: Vec<usize>,
    /// Indices of occupied slots, oldest first.
    arrival_order: Vec<usize>,
    /// Grains that didn't fit in the store during the current frame.
    dropped_grain_count: usize,
}

impl<S: Sample> GrainStore<S> {
    /// Creates a store with room for `slot_count` grains of at most `2 * max_period` samples.
    pub fn new(slot_count: usize, max_period: usize) -> Self {
        if slot_count == 0 {
            panic!("Grain store slot count must be greater than 0")
        }
        let mut slots = Vec::with_capacity(slot_count);
        for _ in 0..slot_count {
            slots.push(AnalysisGrain::new(max_period));
        }
        GrainStore {
            slots,
            free_slots: (0..slot_count).rev().collect(),
            arrival_order: Vec::with_capacity(slot_count),
            dropped_grain_count: 0,
        }
    }

    /// The number of slots needed to hold every grain of a frame, where
    /// grains are at least `min_period` samples apart, plus one carried over grain.
    pub fn slot_count_for(max_frame_size: usize, min_period: usize) -> usize {
        max_frame_size / min_period.max(1) + 2
    }

    /// Prepares for the grains of a new frame of `frame_len` samples. All
    /// grains except the most recent one are retired. The most recent one is
    /// kept with its centre moved to before the start of the new frame.
    pub fn begin_frame(&mut self, frame_len: usize) {
        self.dropped_grain_count = 0;
        let most_recent = match self.arrival_order.pop() {
            Some(slot) => slot,
            None => return,
        };
        for slot in self.arrival_order.drain(..) {
            self.free_slots.push(slot);
        }
        self.slots[most_recent].shift_centre(-(frame_len as isize));
        self.arrival_order.push(most_recent);
    }

    /// Retires all grains.
    pub fn clear(&mut self) {
        for slot in self.arrival_order.drain(..) {
            self.free_slots.push(slot);
        }
        self.dropped_grain_count = 0;
    }

    /// Extracts a grain of `2 * period` samples centred on `centre`. Grains
    /// that don't fit entirely inside `frame` are skipped, as are grains
    /// arriving when all slots are occupied. Returns true if the grain was stored.
    pub fn extract(&mut self, frame: &[S], centre: usize, period: usize) -> bool {
        if period == 0 || centre < period || centre + period > frame.len() {
            return false;
        }
        if let Some(last) = self.arrival_order.last() {
            if self.slots[*last].centre() >= centre as isize {
                return false;
            }
        }
        let slot = match self.free_slots.pop() {
            Some(slot) => slot,
            None => {
                self.dropped_grain_count += 1;
                return false;
            }
        };
        if 2 * period > self.slots[slot].capacity() {
            panic!(
                "Grain of period {} exceeds the slot capacity of {} samples",
                period,
                self.slots[slot].capacity()
            )
        }
        self.slots[slot].fill(frame, centre, period);
        self.arrival_order.push(slot);
        true
    }

    /// Returns the latest grain centred at or before `position`, i.e the most
    /// recently completed grain when the output has reached `position`.
    pub fn most_recent_at(&self, position: isize) -> Option<&AnalysisGrain<S>> {
        self.arrival_order
            .iter()
            .rev()
            .map(|slot| &self.slots[*slot])
            .find(|grain| grain.centre() <= position)
    }

    /// Iterates over the stored grains, oldest first.
    pub fn grains(&self) -> impl Iterator<Item = &AnalysisGrain<S>> {
        self.arrival_order.iter().map(move |slot| &self.slots[*slot])
    }

    pub fn len(&self) -> usize {
        self.arrival_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrival_order.is_empty()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn dropped_grain_count(&self) -> usize {
        self.dropped_grain_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(len: usize) -> Vec<f32> {
        (0..len).map(|i| ((i as f32) * 0.1).sin()).collect()
    }

    #[test]
    fn test_extract_and_lookup() {
        let frame = frame(256);
        let mut store = GrainStore::new(8, 32);
        assert!(store.most_recent_at(1000).is_none());

        // Doesn't fit at the start or end of the frame
        assert!(!store.extract(&frame, 10, 20));
        assert!(!store.extract(&frame, 250, 20));

        assert!(store.extract(&frame, 40, 20));
        assert!(store.extract(&frame, 60, 20));
        assert!(store.extract(&frame, 80, 20));
        assert_eq!(store.len(), 3);

        assert!(store.most_recent_at(39).is_none());
        assert_eq!(store.most_recent_at(40).unwrap().centre(), 40);
        assert_eq!(store.most_recent_at(79).unwrap().centre(), 60);
        assert_eq!(store.most_recent_at(200).unwrap().centre(), 80);
    }

    #[test]
    fn test_begin_frame_carries_over_most_recent() {
        let frame = frame(256);
        let mut store = GrainStore::new(4, 32);
        store.extract(&frame, 100, 30);
        store.extract(&frame, 200, 30);

        store.begin_frame(256);
        assert_eq!(store.len(), 1);
        let carried = store.most_recent_at(0).unwrap();
        assert_eq!(carried.centre(), -56);
        assert_eq!(carried.period(), 30);

        // Slots of retired grains are reused
        assert!(store.extract(&frame, 50, 30));
        assert!(store.extract(&frame, 100, 30));
        assert!(store.extract(&frame, 150, 30));
        assert_eq!(store.len(), 4);
        assert_eq!(store.most_recent_at(10).unwrap().centre(), -56);
    }

    #[test]
    fn test_full_store_drops_grains() {
        let frame = frame(256);
        let mut store = GrainStore::new(2, 32);
        assert!(store.extract(&frame, 40, 20));
        assert!(store.extract(&frame, 80, 20));
        assert!(!store.extract(&frame, 120, 20));
        assert_eq!(store.dropped_grain_count(), 1);
        store.clear();
        assert!(store.is_empty());
        assert!(store.extract(&frame, 120, 20));
    }

    #[test]
    fn test_grains_are_ascending() {
        let frame = frame(256);
        let mut store = GrainStore::new(4, 32);
        assert!(store.extract(&frame, 100, 20));
        assert!(!store.extract(&frame, 100, 20));
        assert!(!store.extract(&frame, 90, 20));
        let centres: Vec<isize> = store.grains().map(|grain| grain.centre()).collect();
        assert_eq!(centres, [100]);
    }

    #[test]
    fn test_slot_count() {
        assert_eq!(GrainStore::<f32>::slot_count_for(2048, 44), 48);
    }
}
