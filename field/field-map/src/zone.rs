//! Field zones: a mesh plus an identifier.

use field_types::{FieldBounds, FieldScalar, FieldVector};
use nalgebra::Point3;

use crate::cache::FieldCache;
use crate::error::FieldResult;
use crate::mesh::Mesh;

/// An axis-aligned region of the field map with its own mesh and scale.
///
/// The identifier singles out zones that callers treat specially, most
/// notably the one rescalable (dipole) zone of a [`FieldMap`](crate::FieldMap).
#[derive(Debug, Clone)]
pub struct Zone<T: FieldScalar = i16> {
    id: i32,
    mesh: Mesh<T>,
}

impl<T: FieldScalar> Zone<T> {
    /// Creates an empty zone over `bounds` with unit multiplier `scale`.
    #[must_use]
    pub fn new(id: i32, bounds: FieldBounds, scale: f64) -> Self {
        Self {
            id,
            mesh: Mesh::new(bounds, scale),
        }
    }

    /// Zone identifier.
    #[must_use]
    pub const fn id(&self) -> i32 {
        self.id
    }

    /// The zone's mesh.
    #[must_use]
    pub const fn mesh(&self) -> &Mesh<T> {
        &self.mesh
    }

    /// Zone box.
    #[must_use]
    pub const fn bounds(&self) -> &FieldBounds {
        self.mesh.bounds()
    }

    /// Checks whether `p` lies inside the zone, boundaries included.
    #[inline]
    #[must_use]
    pub fn contains(&self, p: &Point3<f64>) -> bool {
        self.mesh.contains(p)
    }

    /// Current unit multiplier.
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.mesh.scale()
    }

    /// Set the unit multiplier to `factor` times the nominal one.
    pub fn set_scale_factor(&mut self, factor: f64) {
        self.mesh.set_scale_factor(factor);
    }

    /// Reserve storage for an `nx * ny * nz` mesh.
    pub fn reserve(&mut self, nx: usize, ny: usize, nz: usize) {
        self.mesh.reserve(nx, ny, nz);
    }

    /// Append a mesh break-point along `axis`.
    pub fn append_mesh(&mut self, axis: usize, coord: f64) {
        self.mesh.append_mesh(axis, coord);
    }

    /// Append the next node sample.
    pub fn append_field(&mut self, sample: FieldVector<T>) {
        self.mesh.append_field(sample);
    }

    /// Move the lower boundary along `axis` to `value`.
    ///
    /// Used only while building map lookup tables, to make neighboring zones
    /// agree exactly on shared faces.
    pub fn adjust_min(&mut self, axis: usize, value: f64) {
        self.mesh.set_min_axis(axis, value);
    }

    /// Move the upper boundary along `axis` to `value`.
    pub fn adjust_max(&mut self, axis: usize, value: f64) {
        self.mesh.set_max_axis(axis, value);
    }

    /// Build the mesh lookup tables.
    ///
    /// # Errors
    ///
    /// Returns the mesh error wrapped with this zone's identifier.
    pub fn build_lut(&mut self) -> FieldResult<()> {
        self.mesh.build_lut().map_err(|e| e.in_zone(self.id))
    }

    /// Resolve the mesh cell containing `p` into a fresh cache.
    #[inline]
    #[must_use]
    pub fn cache_at(&self, p: &Point3<f64>, scale_factor: f64) -> Option<FieldCache> {
        self.mesh.cache_at(p, scale_factor)
    }

    /// Approximate bytes held by the zone.
    #[must_use]
    pub fn memory_size(&self) -> usize {
        std::mem::size_of::<i32>() + self.mesh.memory_size()
    }
}
