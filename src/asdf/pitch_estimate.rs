use crate::common::Sample;

#[derive(Copy, Clone, Debug, PartialEq)]
/// The result of estimating the pitch of a single frame.
pub struct PitchEstimate {
    /// The estimated fundamental frequency in Hz, or 0 for unvoiced frames.
    pub frequency: f32,
    /// The chosen integer lag in samples, or 0 for unvoiced frames.
    pub period: usize,
    /// The chosen lag refined by parabolic interpolation of the ASDF minimum.
    pub fractional_period: f32,
    /// The normalized ASDF value at the chosen lag. Values close to 0 indicate
    /// strong periodicity.
    pub asdf_value: f32,
    /// Whether the frame was periodic enough to be assigned a pitch.
    pub voiced: bool,
}

impl PitchEstimate {
    pub(crate) fn unvoiced() -> Self {
        PitchEstimate {
            frequency: 0.0,
            period: 0,
            fractional_period: 0.0,
            asdf_value: 1.0,
            voiced: false,
        }
    }

    /// Indicates if the estimate carries a usable pitch.
    pub fn is_voiced(&self) -> bool {
        self.voiced && self.period > 0
    }
}

impl Default for PitchEstimate {
    fn default() -> Self {
        PitchEstimate::unvoiced()
    }
}

/// Approximates the true position of the minimum at `index` using
/// parabolic interpolation through its left and right neighbors.
/// Returns an offset in the range [-0.5, 0.5] to add to `index`.
pub(crate) fn parabolic_offset<S: Sample>(curve: &[S], index: usize) -> f32 {
    if index == 0 || index + 1 >= curve.len() {
        return 0.0;
    }
    let left = curve[index - 1].to_f32_lossy();
    let center = curve[index].to_f32_lossy();
    let right = curve[index + 1].to_f32_lossy();

    // Coefficients of a parabola ax^2 + bx + c passing through
    // (-1, left), (0, center), (1, right)
    let a = 0.5 * (right - 2.0 * center + left);
    let b = 0.5 * (right - left);
    // Find the x value where the derivative is zero, i.e where the parabola has its minimum
    let x_min = if a > 0.0 { -b / (2.0 * a) } else { 0.0 };
    x_min.max(-0.5).min(0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parabolic_offset() {
        {
            let curve: [f32; 4] = [3.0, 1.0, 3.0, 5.0];
            assert!(parabolic_offset(&curve, 1).abs() <= f32::EPSILON);
        }

        {
            // Samples of (x - 1.25)^2
            let curve: [f64; 3] = [1.5625, 0.0625, 0.5625];
            assert!((parabolic_offset(&curve, 1) - 0.25).abs() <= 1e-6);
        }

        {
            // Edges are not interpolated
            let curve: [f32; 3] = [0.0, 1.0, 2.0];
            assert_eq!(parabolic_offset(&curve, 0), 0.0);
            assert_eq!(parabolic_offset(&curve, 2), 0.0);
        }
    }

    #[test]
    fn test_unvoiced_default() {
        let estimate = PitchEstimate::default();
        assert!(!estimate.is_voiced());
        assert_eq!(estimate.frequency, 0.0);
    }
}
