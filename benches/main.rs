use criterion::{black_box, criterion_group, criterion_main, Criterion};
use micro_psola::psola::PeakFinder;
use micro_psola::{PeriodEstimator, PitchCorrector, PsolaConfig};

fn generate_sine(sample_rate: f32, frequency: f32, sample_count: usize) -> Vec<f32> {
    (0..sample_count)
        .map(|i| (2.0 * core::f32::consts::PI * frequency * (i as f32) / sample_rate).sin())
        .collect()
}

fn run_estimator_benchmark(id: &str, c: &mut Criterion, frequency: f32, min_hz: f32, max_hz: f32) {
    let sample_rate = 44100.0;
    let mut estimator = PeriodEstimator::<f32>::new(sample_rate, min_hz, max_hz);
    let frame = generate_sine(sample_rate, frequency, estimator.latency_samples());
    c.bench_function(id, |b| {
        b.iter(|| {
            estimator.estimate(black_box(&frame[..]));
        })
    });
}

fn estimator_benchmarks(c: &mut Criterion) {
    run_estimator_benchmark("Estimate 220 Hz, range 80-1000 Hz", c, 220.0, 80.0, 1000.0);
    run_estimator_benchmark("Estimate 440 Hz, range 200-1000 Hz", c, 440.0, 200.0, 1000.0);
    run_estimator_benchmark("Estimate 110 Hz, range 60-500 Hz", c, 110.0, 60.0, 500.0);
}

fn peak_finder_benchmarks(c: &mut Criterion) {
    let frame = generate_sine(44100.0, 220.0, 2048);
    let mut peak_finder = PeakFinder::new(frame.len());
    c.bench_function("Find peaks, period 200", |b| {
        b.iter(|| {
            peak_finder.find_peaks(black_box(&frame[..]), 200);
        })
    });
}

fn run_corrector_benchmark(id: &str, c: &mut Criterion, frame_size: usize) {
    let config = PsolaConfig::default().with_max_frame_size(frame_size);
    let mut corrector = PitchCorrector::<f32>::new(config);
    let input = generate_sine(config.sample_rate, 233.0, frame_size);
    let mut output = vec![0.0; frame_size];
    c.bench_function(id, |b| {
        b.iter(|| {
            corrector.process(black_box(&input[..]), &mut output[..]);
        })
    });
}

fn corrector_benchmarks(c: &mut Criterion) {
    run_corrector_benchmark("Correct frame 1102", c, 1102);
    run_corrector_benchmark("Correct frame 2048", c, 2048);
    run_corrector_benchmark("Correct frame 4096", c, 4096);
}

criterion_group!(benches, estimator_benchmarks, peak_finder_benchmarks, corrector_benchmarks);
criterion_main!(benches);
