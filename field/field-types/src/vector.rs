//! Field sample vectors.

use std::fmt::Debug;

use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Storage type of a single field-sample component.
///
/// Field maps are usually written with quantized 16-bit components and a
/// per-zone unit multiplier; full-precision maps store `f32` or `f64`
/// directly. Every storage type widens losslessly to `f64`.
pub trait FieldScalar: Copy + Default + Debug + PartialEq + Send + Sync + 'static {
    /// Widen the component to `f64`.
    fn to_f64(self) -> f64;
}

impl FieldScalar for i16 {
    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl FieldScalar for i32 {
    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl FieldScalar for f32 {
    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl FieldScalar for f64 {
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}

/// A fixed 3-component field sample.
///
/// Samples are immutable once constructed. The storage type `T` is whatever
/// the map was written with; use [`FieldVector::to_vector3`] or
/// [`FieldVector::scaled`] to get a full-precision vector.
///
/// # Example
///
/// ```
/// use field_types::FieldVector;
///
/// let v = FieldVector::new(1_i16, 2, 3);
/// assert_eq!(v.components(), [1, 2, 3]);
/// assert_eq!(v[1], 2);
/// assert_eq!(v.to_vector3().z, 3.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FieldVector<T> {
    components: [T; 3],
}

impl<T: FieldScalar> FieldVector<T> {
    /// Creates a sample from its three components.
    #[inline]
    #[must_use]
    pub const fn new(v0: T, v1: T, v2: T) -> Self {
        Self {
            components: [v0, v1, v2],
        }
    }

    /// Returns the components as an array.
    #[inline]
    #[must_use]
    pub const fn components(&self) -> [T; 3] {
        self.components
    }

    /// Converts the sample to a full-precision vector.
    #[inline]
    #[must_use]
    pub fn to_vector3(&self) -> Vector3<f64> {
        Vector3::new(
            self.components[0].to_f64(),
            self.components[1].to_f64(),
            self.components[2].to_f64(),
        )
    }

    /// Converts the sample to a full-precision vector multiplied by `factor`.
    #[inline]
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Vector3<f64> {
        self.to_vector3() * factor
    }
}

impl<T> From<[T; 3]> for FieldVector<T> {
    fn from(components: [T; 3]) -> Self {
        Self { components }
    }
}

impl<T> std::ops::Index<usize> for FieldVector<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.components[index]
    }
}
