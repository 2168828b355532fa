//! Single-cell field cache and the trilinear interpolation kernel.
//!
//! A [`FieldCache`] holds the eight corner samples of one mesh cell together
//! with the cell box. While successive query points stay inside that box the
//! field is evaluated straight from the cached corners without touching the
//! zone or mesh lookup tables.
//!
//! Corner order follows the bit pattern `(x << 2) | (y << 1) | z`: corner 0 is
//! the low corner of the cell, corner 7 the high one.

use field_types::FieldBounds;
use nalgebra::{Matrix3, Point3, Vector3};

/// The most recently resolved mesh cell.
///
/// A default-constructed cache has an empty box, so
/// [`FieldCache::contains`] fails until the cache is filled.
///
/// # Example
///
/// ```
/// use field_map::FieldCache;
/// use field_types::FieldBounds;
/// use nalgebra::{Point3, Vector3};
///
/// let cache = FieldCache::default();
/// assert!(!cache.is_valid());
///
/// let bounds = FieldBounds::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
/// let corners = [Vector3::new(2.0, 0.0, 0.0); 8];
/// let cache = FieldCache::from_corners(bounds, corners, 0.5);
/// assert!(cache.contains(&Point3::new(0.5, 0.5, 0.5)));
/// assert_eq!(cache.field(&Point3::new(0.5, 0.5, 0.5)), Vector3::new(1.0, 0.0, 0.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCache {
    bounds: FieldBounds,
    corners: [Vector3<f64>; 8],
    scale: f64,
}

impl Default for FieldCache {
    fn default() -> Self {
        Self {
            bounds: FieldBounds::empty(),
            corners: [Vector3::zeros(); 8],
            scale: 1.0,
        }
    }
}

impl FieldCache {
    /// Creates a cache for one cell.
    ///
    /// `corners` are already multiplied by any run-time scale factor; `scale`
    /// is the zone's unit multiplier applied on every evaluation.
    #[must_use]
    pub const fn from_corners(bounds: FieldBounds, corners: [Vector3<f64>; 8], scale: f64) -> Self {
        Self {
            bounds,
            corners,
            scale,
        }
    }

    /// Returns true once the cache has been filled with a non-empty cell.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.bounds.is_empty()
    }

    /// Checks whether `p` lies inside the cached cell, boundaries included.
    #[inline]
    #[must_use]
    pub fn contains(&self, p: &Point3<f64>) -> bool {
        self.bounds.contains(p)
    }

    /// Box of the cached cell.
    #[must_use]
    pub const fn bounds(&self) -> &FieldBounds {
        &self.bounds
    }

    /// Corner samples of the cached cell.
    #[must_use]
    pub const fn corners(&self) -> &[Vector3<f64>; 8] {
        &self.corners
    }

    /// Unit multiplier of the zone the cell came from.
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Reset to the empty state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[inline]
    fn fractions(&self, p: &Point3<f64>) -> [f64; 3] {
        let min = &self.bounds.min;
        let max = &self.bounds.max;
        [
            (p.x - min.x) / (max.x - min.x),
            (p.y - min.y) / (max.y - min.y),
            (p.z - min.z) / (max.z - min.z),
        ]
    }

    /// Trilinearly interpolated field at `p`.
    ///
    /// `p` should lie inside [`FieldCache::bounds`]; points outside are
    /// extrapolated from the same corners.
    #[inline]
    #[must_use]
    pub fn field(&self, p: &Point3<f64>) -> Vector3<f64> {
        let [fx, fy, fz] = self.fractions(p);
        let (gx, gy, gz) = (1.0 - fx, 1.0 - fy, 1.0 - fz);
        let c = &self.corners;

        let b = ((c[0] * gz + c[1] * fz) * gy + (c[2] * gz + c[3] * fz) * fy) * gx
            + ((c[4] * gz + c[5] * fz) * gy + (c[6] * gz + c[7] * fz) * fy) * fx;
        b * self.scale
    }

    /// Interpolated field at `p` and its spatial gradient.
    ///
    /// The gradient matrix holds `gradient[(i, j)] = ∂B_i/∂x_j`, so column `j`
    /// is the derivative of the field vector along axis `j`.
    #[must_use]
    pub fn field_with_gradient(&self, p: &Point3<f64>) -> (Vector3<f64>, Matrix3<f64>) {
        let [fx, fy, fz] = self.fractions(p);
        let (gx, gy, gz) = (1.0 - fx, 1.0 - fy, 1.0 - fz);
        let c = &self.corners;
        let s = self.scale;

        let b = ((c[0] * gz + c[1] * fz) * gy + (c[2] * gz + c[3] * fz) * fy) * gx
            + ((c[4] * gz + c[5] * fz) * gy + (c[6] * gz + c[7] * fz) * fy) * fx;

        let dbdx = (((c[4] - c[0]) * gz + (c[5] - c[1]) * fz) * gy
            + ((c[6] - c[2]) * gz + (c[7] - c[3]) * fz) * fy)
            * (s / self.bounds.width(0));
        let dbdy = (((c[2] - c[0]) * gz + (c[3] - c[1]) * fz) * gx
            + ((c[6] - c[4]) * gz + (c[7] - c[5]) * fz) * fx)
            * (s / self.bounds.width(1));
        let dbdz = (((c[1] - c[0]) * gy + (c[3] - c[2]) * fy) * gx
            + ((c[5] - c[4]) * gy + (c[7] - c[6]) * fy) * fx)
            * (s / self.bounds.width(2));

        (b * s, Matrix3::from_columns(&[dbdx, dbdy, dbdz]))
    }
}
