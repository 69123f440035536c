//! The floating point sample type the engine is generic over.

use num_traits::{Float, FromPrimitive, ToPrimitive};

/// A floating point audio sample. Implemented for `f32` and `f64`.
///
/// All processing types are generic over this trait, so choosing a
/// sample type is a compile time decision with no dispatch cost in
/// the per sample loops.
pub trait Sample: Float + FromPrimitive + ToPrimitive + Default + core::fmt::Debug + 'static {
    /// Converts an `f32` to this sample type.
    fn from_f32_lossy(value: f32) -> Self;

    /// Converts this sample to an `f32`.
    fn to_f32_lossy(self) -> f32;
}

impl Sample for f32 {
    #[inline]
    fn from_f32_lossy(value: f32) -> Self {
        value
    }

    #[inline]
    fn to_f32_lossy(self) -> f32 {
        self
    }
}

impl Sample for f64 {
    #[inline]
    fn from_f32_lossy(value: f32) -> Self {
        value as f64
    }

    #[inline]
    fn to_f32_lossy(self) -> f32 {
        self as f32
    }
}
