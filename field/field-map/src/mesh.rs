//! Non-uniform 3D field mesh for a single zone.
//!
//! A [`Mesh`] stores break-point coordinates per axis and one field sample per
//! grid node, flattened as `(ix * ny + iy) * nz + iz` (x varies slowest). Once
//! [`Mesh::build_lut`] has run, cell location is O(1) per axis.

use field_types::{FieldBounds, FieldScalar, FieldVector};
use nalgebra::{Point3, Vector3};
use tracing::debug;

use crate::cache::FieldCache;
use crate::error::{FieldError, FieldResult};
use crate::lut::AxisLut;

/// Non-uniform grid of field samples inside an axis-aligned box.
///
/// Samples are appended at load time; the mesh must then be finalized with
/// [`Mesh::build_lut`] before it can answer queries.
///
/// # Example
///
/// ```
/// use field_map::Mesh;
/// use field_types::{FieldBounds, FieldVector};
/// use nalgebra::{Point3, Vector3};
///
/// let bounds = FieldBounds::from_extents([0.0, 2.0], [0.0, 1.0], [0.0, 1.0]);
/// let mut mesh: Mesh<f64> = Mesh::new(bounds, 1.0);
/// for x in [0.0, 1.0, 2.0] {
///     mesh.append_mesh(0, x);
/// }
/// for axis in 1..3 {
///     mesh.append_mesh(axis, 0.0);
///     mesh.append_mesh(axis, 1.0);
/// }
/// for ix in 0..3_u32 {
///     for _ in 0..4 {
///         mesh.append_field(FieldVector::new(f64::from(ix), 0.0, 0.0));
///     }
/// }
/// mesh.build_lut().unwrap();
///
/// assert_eq!(mesh.locate_cell(&Point3::new(1.5, 0.5, 0.5)), Some([1, 0, 0]));
/// let cache = mesh.cache_at(&Point3::new(1.5, 0.5, 0.5), 1.0).unwrap();
/// assert_eq!(cache.field(&Point3::new(1.5, 0.5, 0.5)), Vector3::new(1.5, 0.0, 0.0));
/// ```
#[derive(Debug, Clone)]
pub struct Mesh<T: FieldScalar = i16> {
    bounds: FieldBounds,
    coords: [Vec<f64>; 3],
    samples: Vec<FieldVector<T>>,
    scale: f64,
    nominal_scale: f64,
    luts: [AxisLut; 3],
}

impl<T: FieldScalar> Mesh<T> {
    /// Creates an empty mesh over `bounds` with unit multiplier `scale`.
    #[must_use]
    pub fn new(bounds: FieldBounds, scale: f64) -> Self {
        Self {
            bounds,
            coords: [Vec::new(), Vec::new(), Vec::new()],
            samples: Vec::new(),
            scale,
            nominal_scale: scale,
            luts: [AxisLut::default(), AxisLut::default(), AxisLut::default()],
        }
    }

    /// Reserve storage for an `nx * ny * nz` mesh.
    pub fn reserve(&mut self, nx: usize, ny: usize, nz: usize) {
        self.coords[0].reserve(nx);
        self.coords[1].reserve(ny);
        self.coords[2].reserve(nz);
        self.samples.reserve(nx.saturating_mul(ny).saturating_mul(nz));
    }

    /// Append a break-point along `axis`.
    pub fn append_mesh(&mut self, axis: usize, coord: f64) {
        self.coords[axis].push(coord);
    }

    /// Append the next node sample in `(ix, iy, iz)` order, z fastest.
    pub fn append_field(&mut self, sample: FieldVector<T>) {
        self.samples.push(sample);
    }

    /// Declared box of the mesh.
    #[must_use]
    pub const fn bounds(&self) -> &FieldBounds {
        &self.bounds
    }

    /// Break-points along `axis`.
    #[must_use]
    pub fn coords(&self, axis: usize) -> &[f64] {
        &self.coords[axis]
    }

    /// Number of break-points per axis.
    #[must_use]
    pub fn dimensions(&self) -> [usize; 3] {
        [self.coords[0].len(), self.coords[1].len(), self.coords[2].len()]
    }

    /// All node samples in storage order.
    #[must_use]
    pub fn samples(&self) -> &[FieldVector<T>] {
        &self.samples
    }

    /// Sample at node `(ix, iy, iz)`, or `None` if out of range.
    #[must_use]
    pub fn node(&self, ix: usize, iy: usize, iz: usize) -> Option<&FieldVector<T>> {
        let [nx, ny, nz] = self.dimensions();
        if ix >= nx || iy >= ny || iz >= nz {
            return None;
        }
        self.samples.get((ix * ny + iy) * nz + iz)
    }

    /// Current unit multiplier.
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Unit multiplier as loaded.
    #[must_use]
    pub const fn nominal_scale(&self) -> f64 {
        self.nominal_scale
    }

    /// Set the unit multiplier to `factor` times the nominal one.
    ///
    /// Repeated calls do not compound.
    pub fn set_scale_factor(&mut self, factor: f64) {
        self.scale = factor * self.nominal_scale;
    }

    /// Checks whether `p` lies inside the mesh box, boundaries included.
    #[inline]
    #[must_use]
    pub fn contains(&self, p: &Point3<f64>) -> bool {
        self.bounds.contains(p)
    }

    /// Returns true once [`Mesh::build_lut`] has succeeded.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.luts.iter().all(|lut| !lut.is_empty())
    }

    pub(crate) fn set_min_axis(&mut self, axis: usize, value: f64) {
        self.bounds.set_min_axis(axis, value);
        if let Some(first) = self.coords[axis].first_mut() {
            *first = value;
        }
    }

    pub(crate) fn set_max_axis(&mut self, axis: usize, value: f64) {
        self.bounds.set_max_axis(axis, value);
        if let Some(last) = self.coords[axis].last_mut() {
            *last = value;
        }
    }

    /// Check the loaded data before building lookup tables.
    fn validate(&self) -> FieldResult<()> {
        if !self.bounds.is_finite() || self.bounds.is_empty() {
            return Err(FieldError::InvalidBounds {
                min: self.bounds.min.coords.into(),
                max: self.bounds.max.coords.into(),
            });
        }
        if !self.scale.is_finite() {
            return Err(FieldError::InvalidScale(self.scale));
        }

        for (axis, coords) in self.coords.iter().enumerate() {
            if coords.is_empty() {
                return Err(FieldError::EmptyAxis { axis });
            }
        }

        let expected = self.dimensions().iter().product();
        if self.samples.len() != expected {
            return Err(FieldError::SampleCountMismatch {
                expected,
                got: self.samples.len(),
            });
        }

        for (axis, coords) in self.coords.iter().enumerate() {
            let width = self.bounds.width(axis);
            if coords.len() < 2 || width <= 0.0 {
                return Err(FieldError::DegenerateMesh {
                    axis,
                    points: coords.len(),
                    width,
                });
            }
        }
        Ok(())
    }

    /// Finalize the mesh and build its per-axis lookup tables.
    ///
    /// The first and last break-point on each axis are snapped to the
    /// declared box, removing load-time rounding.
    ///
    /// # Errors
    ///
    /// Returns an error if an axis is empty, the sample count does not match
    /// the mesh dimensions, an axis has fewer than two break-points or zero
    /// width, or break-points are not strictly increasing.
    pub fn build_lut(&mut self) -> FieldResult<()> {
        self.validate()?;

        for axis in 0..3 {
            let min = self.bounds.min_axis(axis);
            let max = self.bounds.max_axis(axis);
            let coords = &mut self.coords[axis];
            let last = coords.len() - 1;
            coords[0] = min;
            coords[last] = max;

            if let Some(index) = coords.windows(2).position(|w| w[1] <= w[0] || !w[1].is_finite()) {
                return Err(FieldError::NonMonotonicAxis {
                    axis,
                    index: index + 1,
                });
            }
        }

        for axis in 0..3 {
            self.luts[axis] = AxisLut::build(&self.coords[axis]);
        }

        debug!(
            nodes = ?self.dimensions(),
            lut = ?[self.luts[0].len(), self.luts[1].len(), self.luts[2].len()],
            "Built mesh lookup tables"
        );
        Ok(())
    }

    /// Indices `(ix, iy, iz)` of the cell containing `p`.
    ///
    /// Returns `None` if `p` is outside the mesh box or the lookup tables
    /// have not been built.
    #[inline]
    #[must_use]
    pub fn locate_cell(&self, p: &Point3<f64>) -> Option<[usize; 3]> {
        if !self.contains(p) || !self.is_built() {
            return None;
        }
        Some([
            self.luts[0].locate(&self.coords[0], p.x),
            self.luts[1].locate(&self.coords[1], p.y),
            self.luts[2].locate(&self.coords[2], p.z),
        ])
    }

    /// Resolve the cell containing `p` into a fresh cache.
    ///
    /// Corner samples are multiplied by `scale_factor`; the cache evaluates
    /// with this mesh's current unit multiplier.
    #[must_use]
    pub fn cache_at(&self, p: &Point3<f64>, scale_factor: f64) -> Option<FieldCache> {
        let [ix, iy, iz] = self.locate_cell(p)?;
        let [xs, ys, zs] = &self.coords;
        let bounds = FieldBounds {
            min: Point3::new(xs[ix], ys[iy], zs[iz]),
            max: Point3::new(xs[ix + 1], ys[iy + 1], zs[iz + 1]),
        };

        let [_, ny, nz] = self.dimensions();
        let corner = |dx: usize, dy: usize, dz: usize| -> Vector3<f64> {
            self.samples[((ix + dx) * ny + iy + dy) * nz + iz + dz].scaled(scale_factor)
        };
        let corners = [
            corner(0, 0, 0),
            corner(0, 0, 1),
            corner(0, 1, 0),
            corner(0, 1, 1),
            corner(1, 0, 0),
            corner(1, 0, 1),
            corner(1, 1, 0),
            corner(1, 1, 1),
        ];

        Some(FieldCache::from_corners(bounds, corners, self.scale))
    }

    /// Approximate bytes held by the mesh.
    #[must_use]
    pub fn memory_size(&self) -> usize {
        std::mem::size_of::<Self>()
            + self
                .coords
                .iter()
                .map(|c| c.capacity() * std::mem::size_of::<f64>())
                .sum::<usize>()
            + self.samples.capacity() * std::mem::size_of::<FieldVector<T>>()
            + self.luts.iter().map(AxisLut::memory_size).sum::<usize>()
    }
}
