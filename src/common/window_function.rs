//! Grain envelopes.

use core::f32::consts::PI;

use super::sample::Sample;

/// Performs point-wise multiplication of a buffer and the
/// [Hann window](https://en.wikipedia.org/wiki/Window_function#Hann_and_Hamming_windows).
/// Used as the analysis grain envelope, so that two grains
/// overlapping by half their length sum to (approximately) unity.
pub fn hann_window<S: Sample>(buffer: &mut [S]) {
    let len = buffer.len();
    if len < 2 {
        return;
    }

    // sin(0.5 * pi * x) can be approximated with a
    // max error below 0.001 and exactly matching endpoints on [-1, 1] as
    // ax^5 + bx^3 + cx,
    // where
    // a = pi / 2 - 1.5
    // b = 2.5 - pi
    // c = pi / 2
    let a = 0.5 * (PI / 2. - 1.5);
    let b = 0.5 * (2.5 - PI);
    let c = 0.5 * PI / 2.;
    let d = 0.5;
    let window_value = |x: f32| {
        let x3 = x * x * x;
        let x5 = x3 * x * x;
        S::from_f32_lossy(a * x5 + b * x3 + c * x + d)
    };

    // Evaluate window in two halves
    let len_is_even = len % 2 == 0;
    let left_half_end_len = if len_is_even { len / 2 } else { len / 2 + 1 };
    let dx = 4. / ((len - 1) as f32);
    let mut x = -1.0;
    for value in buffer.iter_mut().take(left_half_end_len) {
        *value = *value * window_value(x);
        x += dx;
    }

    x = if len_is_even { 1.0 - 0.5 * dx } else { 1.0 - dx };
    for value in buffer.iter_mut().skip(left_half_end_len) {
        *value = *value * window_value(x);
        x -= dx;
    }
}
