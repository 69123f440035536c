use std::thread;
use std::time::Duration;

use micro_psola::{telemetry_channel, EqualTemperament, PitchCorrector, PitchReading, PsolaConfig};

fn note_name(pitch: i32) -> String {
    let note_names = [
        "C", "C#/D♭", "D", "D#/E♭", "E", "F", "F#/G♭", "G", "G#/A♭", "A", "A#/B♭", "B",
    ];
    let note_in_octave = pitch.rem_euclid(12) as usize;
    let octave = pitch.div_euclid(12) - 1;
    format!("{:>5}{}", note_names[note_in_octave], octave)
}

fn print_reading(reading: &PitchReading) {
    if reading.voiced {
        let cent_sign = if reading.cents_sharp >= 0 { "+" } else { "-" };
        println!(
            "{} | {}{:02} cents | {:.2} Hz",
            note_name(reading.corrected_pitch),
            cent_sign,
            reading.cents_sharp.abs(),
            reading.frequency
        );
    } else {
        println!("  --- | unvoiced");
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let config = PsolaConfig::default();
    let frame_size = config.max_frame_size;
    let frame_count = 40;

    // A slightly sharp A3 gliding up towards B3, followed by silence
    let mut phase = 0.0_f32;
    let mut input: Vec<f32> = Vec::with_capacity(frame_size * frame_count);
    for i in 0..(frame_size * (frame_count - 4)) {
        let t = i as f32 / (frame_size * (frame_count - 4)) as f32;
        let frequency = 222.0 + t * (247.0 - 222.0);
        phase += 2.0 * core::f32::consts::PI * frequency / config.sample_rate;
        input.push(0.5 * phase.sin());
    }
    input.resize(frame_size * frame_count, 0.0);

    let (sender, mut receiver) = telemetry_channel(64);

    // Process on a separate thread, standing in for an audio callback.
    let processing_thread = thread::spawn(move || {
        // Correct to the nearest semitone, an octave up
        let mut corrector =
            PitchCorrector::with_mappings(config, EqualTemperament::default(), EqualTemperament::new(880.0));
        corrector.set_telemetry_sender(sender);
        let mut output = vec![0.0_f32; input.len()];
        for (input_frame, output_frame) in input.chunks_exact(frame_size).zip(output.chunks_exact_mut(frame_size)) {
            corrector.process(input_frame, output_frame);
            thread::sleep(Duration::from_millis(5));
        }
        output
    });

    let poll_interval_ms = 20;
    loop {
        let finished = processing_thread.is_finished();
        for reading in receiver.drain() {
            print_reading(&reading);
        }
        if finished {
            break;
        }
        thread::sleep(Duration::from_millis(poll_interval_ms));
    }

    let output = match processing_thread.join() {
        Ok(output) => output,
        Err(_) => {
            eprintln!("Processing thread panicked");
            return;
        }
    };
    let peak = output.iter().fold(0.0_f32, |max, value| max.max(value.abs()));
    println!("Processed {} samples, output peak level {:.3}", output.len(), peak);
}
