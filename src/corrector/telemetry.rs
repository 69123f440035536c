//! Passing pitch readings from the audio thread to other threads without
//! blocking or allocating.

#[derive(Copy, Clone, Debug, PartialEq)]
/// The outcome of correcting one frame.
pub struct PitchReading {
    /// The detected frequency in Hz, or 0 for unvoiced frames.
    pub frequency: f32,
    pub voiced: bool,
    /// The pitch number the output was corrected to.
    pub corrected_pitch: i32,
    /// How far above the corrected pitch the input was, in cents.
    pub cents_sharp: i32,
}

/// The audio thread end of a telemetry channel.
pub struct TelemetrySender {
    producer: rtrb::Producer<PitchReading>,
    dropped_count: usize,
}

impl TelemetrySender {
    /// Pushes a reading without blocking. Returns false, dropping the
    /// reading, if the channel is full.
    pub fn send(&mut self, reading: PitchReading) -> bool {
        match self.producer.push(reading) {
            Ok(()) => true,
            Err(_) => {
                self.dropped_count += 1;
                false
            }
        }
    }

    /// The number of readings dropped because the channel was full.
    pub fn dropped_count(&self) -> usize {
        self.dropped_count
    }
}

/// The receiving end of a telemetry channel.
pub struct TelemetryReceiver {
    consumer: rtrb::Consumer<PitchReading>,
}

impl TelemetryReceiver {
    /// Pops the oldest pending reading, if any.
    pub fn try_recv(&mut self) -> Option<PitchReading> {
        self.consumer.pop().ok()
    }

    /// Pops all pending readings.
    pub fn drain(&mut self) -> impl Iterator<Item = PitchReading> + '_ {
        core::iter::from_fn(move || self.try_recv())
    }

    /// The number of pending readings.
    pub fn pending_count(&self) -> usize {
        self.consumer.slots()
    }
}

/// Creates a lock free, single producer single consumer channel with room
/// for `capacity` pending readings.
pub fn telemetry_channel(capacity: usize) -> (TelemetrySender, TelemetryReceiver) {
    let (producer, consumer) = rtrb::RingBuffer::new(capacity);
    (
        TelemetrySender {
            producer,
            dropped_count: 0,
        },
        TelemetryReceiver { consumer },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(corrected_pitch: i32) -> PitchReading {
        PitchReading {
            frequency: 440.0,
            voiced: true,
            corrected_pitch,
            cents_sharp: 0,
        }
    }

    #[test]
    fn test_send_and_receive() {
        let (mut sender, mut receiver) = telemetry_channel(4);
        assert!(receiver.try_recv().is_none());
        assert!(sender.send(reading(60)));
        assert!(sender.send(reading(61)));
        assert_eq!(receiver.pending_count(), 2);
        let pitches: Vec<i32> = receiver.drain().map(|reading| reading.corrected_pitch).collect();
        assert_eq!(pitches, [60, 61]);
        assert_eq!(receiver.pending_count(), 0);
    }

    #[test]
    fn test_full_channel_drops_readings() {
        let (mut sender, mut receiver) = telemetry_channel(2);
        assert!(sender.send(reading(1)));
        assert!(sender.send(reading(2)));
        assert!(!sender.send(reading(3)));
        assert_eq!(sender.dropped_count(), 1);
        assert_eq!(receiver.try_recv(), Some(reading(1)));
    }

    #[test]
    fn test_across_threads() {
        let (mut sender, mut receiver) = telemetry_channel(16);
        let handle = std::thread::spawn(move || {
            for pitch in 0..8 {
                sender.send(reading(pitch));
            }
        });
        handle.join().unwrap();
        assert_eq!(receiver.drain().count(), 8);
    }
}
