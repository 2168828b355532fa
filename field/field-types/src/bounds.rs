//! Axis-aligned field bounds.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned box `[xmin,xmax]×[ymin,ymax]×[zmin,zmax]`.
///
/// Containment is inclusive on every face, so two boxes sharing a face both
/// contain points on that face. Axis indices are `0 = x`, `1 = y`, `2 = z`.
///
/// # Example
///
/// ```
/// use field_types::{FieldBounds, Point3};
///
/// let bounds = FieldBounds::new(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(10.0, 20.0, 30.0),
/// );
///
/// assert_eq!(bounds.width(1), 20.0);
/// assert!(bounds.contains(&Point3::new(10.0, 20.0, 30.0)));
/// assert!(!bounds.contains(&Point3::new(10.5, 0.0, 0.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldBounds {
    /// Minimum corner (inclusive).
    pub min: Point3<f64>,
    /// Maximum corner (inclusive).
    pub max: Point3<f64>,
}

impl FieldBounds {
    /// Creates bounds from two corners.
    ///
    /// The corners are automatically ordered so min ≤ max on each axis.
    #[must_use]
    pub fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Creates bounds from per-axis `[min, max]` pairs.
    #[must_use]
    pub fn from_extents(x: [f64; 2], y: [f64; 2], z: [f64; 2]) -> Self {
        Self::new(Point3::new(x[0], y[0], z[0]), Point3::new(x[1], y[1], z[1]))
    }

    /// Creates an empty (invalid) box that contains no point.
    ///
    /// # Example
    ///
    /// ```
    /// use field_types::{FieldBounds, Point3};
    ///
    /// let bounds = FieldBounds::empty();
    /// assert!(bounds.is_empty());
    /// assert!(!bounds.contains(&Point3::new(0.0, 0.0, 0.0)));
    /// ```
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Point3::new is not const in nalgebra
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Returns true if min > max on any axis.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Returns true if all corner coordinates are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.min.coords.iter().chain(self.max.coords.iter()).all(|v| v.is_finite())
    }

    /// Checks whether the box contains a point, boundaries included.
    ///
    /// NaN coordinates are never contained.
    #[inline]
    #[must_use]
    pub fn contains(&self, p: &Point3<f64>) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Minimum coordinate along `axis`.
    #[inline]
    #[must_use]
    pub fn min_axis(&self, axis: usize) -> f64 {
        self.min[axis]
    }

    /// Maximum coordinate along `axis`.
    #[inline]
    #[must_use]
    pub fn max_axis(&self, axis: usize) -> f64 {
        self.max[axis]
    }

    /// Sets the minimum coordinate along `axis`.
    pub fn set_min_axis(&mut self, axis: usize, value: f64) {
        self.min[axis] = value;
    }

    /// Sets the maximum coordinate along `axis`.
    pub fn set_max_axis(&mut self, axis: usize, value: f64) {
        self.max[axis] = value;
    }

    /// Extent of the box along `axis`.
    #[inline]
    #[must_use]
    pub fn width(&self, axis: usize) -> f64 {
        self.max[axis] - self.min[axis]
    }

    /// Geometric center of the box.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Volume of the box, zero when empty.
    #[must_use]
    pub fn volume(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.width(0) * self.width(1) * self.width(2)
    }
}

impl Default for FieldBounds {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit() -> FieldBounds {
        FieldBounds::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn new_orders_corners() {
        let b = FieldBounds::new(Point3::new(1.0, -1.0, 5.0), Point3::new(-1.0, 1.0, 0.0));
        assert_eq!(b.min, Point3::new(-1.0, -1.0, 0.0));
        assert_eq!(b.max, Point3::new(1.0, 1.0, 5.0));
    }

    #[test]
    fn from_extents_matches_new() {
        let b = FieldBounds::from_extents([-1.0, 1.0], [-2.0, 2.0], [0.0, 3.0]);
        assert_eq!(b.min_axis(1), -2.0);
        assert_eq!(b.max_axis(2), 3.0);
        assert_relative_eq!(b.width(0), 2.0);
    }

    #[test]
    fn contains_is_inclusive() {
        let b = unit();
        assert!(b.contains(&Point3::origin()));
        assert!(b.contains(&Point3::new(1.0, 1.0, 1.0)));
        assert!(b.contains(&Point3::new(0.5, 0.0, 1.0)));
        assert!(!b.contains(&Point3::new(1.0 + 1e-12, 0.5, 0.5)));
        assert!(!b.contains(&Point3::new(0.5, -1e-12, 0.5)));
    }

    #[test]
    fn nan_is_never_contained() {
        assert!(!unit().contains(&Point3::new(f64::NAN, 0.5, 0.5)));
    }

    #[test]
    fn empty_contains_nothing() {
        let b = FieldBounds::default();
        assert!(b.is_empty());
        assert!(!b.contains(&Point3::origin()));
        assert!(!b.contains(&Point3::new(f64::INFINITY, 0.0, 0.0)));
        assert_eq!(b.volume(), 0.0);
    }

    #[test]
    fn axis_setters() {
        let mut b = unit();
        b.set_min_axis(0, -1.0);
        b.set_max_axis(2, 4.0);
        assert_relative_eq!(b.width(0), 2.0);
        assert_relative_eq!(b.width(2), 4.0);
        assert_relative_eq!(b.volume(), 8.0);
    }

    #[test]
    fn center_and_finite() {
        let b = FieldBounds::from_extents([0.0, 2.0], [0.0, 4.0], [-2.0, 2.0]);
        assert_eq!(b.center(), Point3::new(1.0, 2.0, 0.0));
        assert!(b.is_finite());
        assert!(!FieldBounds::empty().is_finite());
    }
}
