//! Zone-partitioned field map with O(1) zone location.
//!
//! Zone boundaries along each axis are collected into a global edge list.
//! The edge lists split the map box into a coarse grid whose cells each lie
//! entirely inside or outside every zone; a table indexed by that grid gives
//! the owning zone of any point with one lookup per axis.
//!
//! # Shared faces
//!
//! Among all zones whose closed box contains a point, the one loaded last
//! wins. This holds both for grid cell centers while the table is built and
//! for points lying exactly on a shared face at query time, so
//! [`FieldMap::find_zone`] always agrees with [`FieldMap::find_zone_slow`].

use field_types::{FieldBounds, FieldScalar};
use nalgebra::{Matrix3, Point3, Vector3};
use tracing::{debug, info, warn};

use crate::config::FieldMapConfig;
use crate::error::{FieldError, FieldResult};
use crate::lut::AxisLut;
use crate::query::FieldQuery;
use crate::record::ZoneRecord;
use crate::scale::ScaleSource;
use crate::zone::Zone;

/// The full field: an ordered set of zones plus global lookup tables.
///
/// Zones are appended at load time with [`FieldMap::push_zone`], after which
/// [`FieldMap::build_lut`] finalizes the map. Queries go through a per-caller
/// [`FieldQuery`].
///
/// # Example
///
/// ```
/// use field_map::{FieldMap, FieldMapConfig, ScaleFactor, Zone};
/// use field_types::{FieldBounds, FieldVector};
/// use nalgebra::{Point3, Vector3};
///
/// let mut map: FieldMap<f64> = FieldMap::new(FieldMapConfig::default());
/// let mut zone = Zone::new(1, FieldBounds::from_extents([0.0, 1.0], [0.0, 1.0], [0.0, 1.0]), 1.0);
/// for axis in 0..3 {
///     zone.append_mesh(axis, 0.0);
///     zone.append_mesh(axis, 1.0);
/// }
/// for _ in 0..8 {
///     zone.append_field(FieldVector::new(0.0, 0.0, 2.0));
/// }
/// map.push_zone(zone);
/// map.build_lut().unwrap();
///
/// let mut query = map.query(ScaleFactor::unit()).unwrap();
/// assert_eq!(query.field(&Point3::new(0.5, 0.5, 0.5)), Vector3::new(0.0, 0.0, 2.0));
/// assert_eq!(query.field(&Point3::new(5.0, 0.0, 0.0)), map.fallback_field());
/// ```
#[derive(Debug, Clone)]
pub struct FieldMap<T: FieldScalar = i16> {
    zones: Vec<Zone<T>>,
    edges: [Vec<f64>; 3],
    edge_luts: [AxisLut; 3],
    zone_lut: Vec<Option<usize>>,
    bounds: FieldBounds,
    config: FieldMapConfig,
    built: bool,
}

impl<T: FieldScalar> FieldMap<T> {
    /// Creates an empty map.
    #[must_use]
    pub fn new(config: FieldMapConfig) -> Self {
        Self::with_capacity(0, config)
    }

    /// Creates an empty map with room for `zones` zones.
    #[must_use]
    pub fn with_capacity(zones: usize, config: FieldMapConfig) -> Self {
        Self {
            zones: Vec::with_capacity(zones),
            edges: [Vec::new(), Vec::new(), Vec::new()],
            edge_luts: [AxisLut::default(), AxisLut::default(), AxisLut::default()],
            zone_lut: Vec::new(),
            bounds: FieldBounds::empty(),
            config,
            built: false,
        }
    }

    /// Build a ready-to-query map from zone records.
    ///
    /// # Errors
    ///
    /// Returns the first record or lookup-table error; no partially built
    /// map is returned.
    pub fn from_records<I>(records: I, config: FieldMapConfig) -> FieldResult<Self>
    where
        I: IntoIterator<Item = ZoneRecord<T>>,
    {
        let records = records.into_iter();
        let mut map = Self::with_capacity(records.size_hint().0, config);
        for record in records {
            map.push_zone(record.into_zone()?);
        }
        map.build_lut()?;
        Ok(map)
    }

    /// Append a zone and return its index.
    ///
    /// Later zones take precedence over earlier ones where boxes touch. The
    /// map must be rebuilt before it answers queries again.
    pub fn push_zone(&mut self, zone: Zone<T>) -> usize {
        self.built = false;
        self.zones.push(zone);
        self.zones.len() - 1
    }

    /// Finalize zones and build the global lookup tables.
    ///
    /// Zone boundaries within the configured edge tolerance are merged and
    /// every zone is snapped onto the merged edges before its own mesh
    /// tables are built.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::EmptyMap`] if no zones were added, or the first
    /// zone validation error.
    pub fn build_lut(&mut self) -> FieldResult<()> {
        self.built = false;
        if self.zones.is_empty() {
            return Err(FieldError::EmptyMap);
        }
        let tolerance = self.config.edge_tolerance;

        for zone in &self.zones {
            let b = zone.bounds();
            if !b.is_finite() || b.is_empty() {
                return Err(FieldError::InvalidBounds {
                    min: b.min.coords.into(),
                    max: b.max.coords.into(),
                }
                .in_zone(zone.id()));
            }
        }

        for axis in 0..3 {
            let mut edge: Vec<f64> = self
                .zones
                .iter()
                .flat_map(|z| [z.bounds().min_axis(axis), z.bounds().max_axis(axis)])
                .collect();
            edge.sort_by(f64::total_cmp);
            edge.dedup_by(|next, kept| (*next - *kept).abs() < tolerance);

            for zone in &mut self.zones {
                let min = snap_to_edge(&edge, zone.bounds().min_axis(axis), tolerance);
                let max = snap_to_edge(&edge, zone.bounds().max_axis(axis), tolerance);
                if min != zone.bounds().min_axis(axis) || max != zone.bounds().max_axis(axis) {
                    debug!(zone = zone.id(), axis, min, max, "Snapped zone boundary to shared edge");
                }
                zone.adjust_min(axis, min);
                zone.adjust_max(axis, max);
            }
            self.edges[axis] = edge;
        }

        for zone in &mut self.zones {
            zone.build_lut()?;
        }

        for axis in 0..3 {
            self.edge_luts[axis] = AxisLut::build(&self.edges[axis]);
        }
        self.bounds = FieldBounds {
            min: Point3::new(self.edges[0][0], self.edges[1][0], self.edges[2][0]),
            max: Point3::new(
                self.edges[0][self.edges[0].len() - 1],
                self.edges[1][self.edges[1].len() - 1],
                self.edges[2][self.edges[2].len() - 1],
            ),
        };

        let [nx, ny, nz] = self.grid_dimensions();
        let mut zone_lut = Vec::with_capacity(nx * ny * nz);
        for ix in 0..nx {
            for iy in 0..ny {
                for iz in 0..nz {
                    let center = Point3::new(
                        f64::midpoint(self.edges[0][ix], self.edges[0][ix + 1]),
                        f64::midpoint(self.edges[1][iy], self.edges[1][iy + 1]),
                        f64::midpoint(self.edges[2][iz], self.edges[2][iz + 1]),
                    );
                    zone_lut.push(self.find_zone_index_slow(&center));
                }
            }
        }
        self.zone_lut = zone_lut;
        self.built = true;

        let gaps = self.zone_lut.iter().filter(|z| z.is_none()).count();
        if gaps > 0 {
            warn!(
                gaps,
                cells = self.zone_lut.len(),
                "Field map has cells not covered by any zone"
            );
        }
        if let Some(id) = self.config.rescalable_zone {
            if self.zone_by_id(id).is_none() {
                warn!(zone = id, "Rescalable zone is not present in the field map");
            }
        }
        info!(
            zones = self.zones.len(),
            edges = ?[nx + 1, ny + 1, nz + 1],
            cells = self.zone_lut.len(),
            memory = self.memory_size(),
            "Built field map lookup tables"
        );
        Ok(())
    }

    /// Coarse grid cells per axis.
    fn grid_dimensions(&self) -> [usize; 3] {
        [
            self.edges[0].len().saturating_sub(1),
            self.edges[1].len().saturating_sub(1),
            self.edges[2].len().saturating_sub(1),
        ]
    }

    /// Index of the zone containing `p`, or `None` outside coverage.
    ///
    /// Where zone boxes touch, the last-loaded zone containing `p` wins.
    #[must_use]
    pub fn find_zone_index(&self, p: &Point3<f64>) -> Option<usize> {
        if !self.built || !self.bounds.contains(p) {
            return None;
        }
        let [_, ny, nz] = self.grid_dimensions();
        let coords = [p.x, p.y, p.z];
        let cells: [usize; 3] =
            std::array::from_fn(|axis| self.edge_luts[axis].locate(&self.edges[axis], coords[axis]));

        let zone = self.zone_lut[(cells[0] * ny + cells[1]) * nz + cells[2]];

        // A point on a grid face also belongs to the cell across that face
        let alternates: [Option<usize>; 3] = std::array::from_fn(|axis| {
            let edges = &self.edges[axis];
            let i = cells[axis];
            let x = coords[axis];
            if x == edges[i + 1] && i + 2 < edges.len() {
                Some(i + 1)
            } else if x == edges[i] && i > 0 {
                Some(i - 1)
            } else {
                None
            }
        });
        if alternates.iter().all(Option::is_none) {
            return zone;
        }

        let mut best = zone;
        for mask in 1..8_usize {
            let pick = |axis: usize| -> Option<usize> {
                if mask & (4 >> axis) == 0 {
                    Some(cells[axis])
                } else {
                    alternates[axis]
                }
            };
            if let (Some(ix), Some(iy), Some(iz)) = (pick(0), pick(1), pick(2)) {
                best = best.max(self.zone_lut[(ix * ny + iy) * nz + iz]);
            }
        }
        best
    }

    /// The zone containing `p`, or `None` outside coverage.
    #[inline]
    #[must_use]
    pub fn find_zone(&self, p: &Point3<f64>) -> Option<&Zone<T>> {
        self.find_zone_index(p).map(|i| &self.zones[i])
    }

    /// Index of the last-loaded zone containing `p`, by linear scan.
    #[must_use]
    pub fn find_zone_index_slow(&self, p: &Point3<f64>) -> Option<usize> {
        self.zones.iter().rposition(|z| z.contains(p))
    }

    /// The last-loaded zone containing `p`, by linear scan.
    #[must_use]
    pub fn find_zone_slow(&self, p: &Point3<f64>) -> Option<&Zone<T>> {
        self.find_zone_index_slow(p).map(|i| &self.zones[i])
    }

    /// Rescale the rescalable zone to `factor` times its nominal scale.
    ///
    /// Other zones are never touched. Does nothing if no rescalable zone is
    /// configured or present.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::InvalidScale`] if `factor` is not finite.
    pub fn rescale_zone(&mut self, factor: f64) -> FieldResult<()> {
        if !factor.is_finite() {
            return Err(FieldError::InvalidScale(factor));
        }
        let Some(id) = self.config.rescalable_zone else {
            debug!(factor, "No rescalable zone configured");
            return Ok(());
        };
        if let Some(zone) = self.zones.iter_mut().find(|z| z.id() == id) {
            zone.set_scale_factor(factor);
            info!(zone = id, factor, scale = zone.scale(), "Rescaled field zone");
        }
        Ok(())
    }

    /// Start a query context reading the scale factor from `scale`.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::MapNotBuilt`] if the lookup tables have not
    /// been built.
    pub fn query<S: ScaleSource>(&self, scale: S) -> FieldResult<FieldQuery<'_, T, S>> {
        if !self.built {
            return Err(FieldError::MapNotBuilt);
        }
        Ok(FieldQuery::new(self, scale))
    }

    /// Field at `p` computed from scratch, bypassing any cache.
    #[must_use]
    pub fn field_uncached(&self, p: &Point3<f64>, scale_factor: f64) -> Vector3<f64> {
        self.find_zone(p)
            .and_then(|zone| zone.cache_at(p, scale_factor))
            .map_or(self.config.fallback_field, |cache| cache.field(p))
    }

    /// Field and gradient at `p` computed from scratch, bypassing any cache.
    #[must_use]
    pub fn field_with_gradient_uncached(
        &self,
        p: &Point3<f64>,
        scale_factor: f64,
    ) -> (Vector3<f64>, Matrix3<f64>) {
        self.find_zone(p)
            .and_then(|zone| zone.cache_at(p, scale_factor))
            .map_or((self.config.fallback_field, Matrix3::zeros()), |cache| {
                cache.field_with_gradient(p)
            })
    }

    /// Field returned outside coverage.
    #[must_use]
    pub fn fallback_field(&self) -> Vector3<f64> {
        self.config.fallback_field
    }

    /// Global bounding box; empty until the tables are built.
    #[must_use]
    pub const fn bounds(&self) -> &FieldBounds {
        &self.bounds
    }

    /// All zones in load order.
    #[must_use]
    pub fn zones(&self) -> &[Zone<T>] {
        &self.zones
    }

    /// Zone at load index `index`.
    #[must_use]
    pub fn zone(&self, index: usize) -> Option<&Zone<T>> {
        self.zones.get(index)
    }

    /// First zone with identifier `id`.
    #[must_use]
    pub fn zone_by_id(&self, id: i32) -> Option<&Zone<T>> {
        self.zones.iter().find(|z| z.id() == id)
    }

    /// Identifier of the rescalable zone, if configured.
    #[must_use]
    pub const fn rescalable_zone_id(&self) -> Option<i32> {
        self.config.rescalable_zone
    }

    /// Merged zone edges along `axis`.
    #[must_use]
    pub fn edges(&self, axis: usize) -> &[f64] {
        &self.edges[axis]
    }

    /// Number of coarse grid cells in the zone table.
    #[must_use]
    pub fn zone_lut_len(&self) -> usize {
        self.zone_lut.len()
    }

    /// Returns true once [`FieldMap::build_lut`] has succeeded.
    #[must_use]
    pub const fn is_built(&self) -> bool {
        self.built
    }

    /// Map configuration.
    #[must_use]
    pub const fn config(&self) -> &FieldMapConfig {
        &self.config
    }

    /// Approximate bytes held by the map and all its zones.
    #[must_use]
    pub fn memory_size(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.zones.iter().map(Zone::memory_size).sum::<usize>()
            + self
                .edges
                .iter()
                .map(|e| e.capacity() * std::mem::size_of::<f64>())
                .sum::<usize>()
            + self.edge_luts.iter().map(AxisLut::memory_size).sum::<usize>()
            + self.zone_lut.capacity() * std::mem::size_of::<Option<usize>>()
    }
}

#[cfg(feature = "parallel")]
impl<T: FieldScalar> FieldMap<T> {
    /// Evaluate the field at many points in parallel.
    ///
    /// Each rayon worker gets its own [`FieldQuery`] and cache; the map is
    /// only read.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::MapNotBuilt`] if the lookup tables have not
    /// been built.
    pub fn fields_par<S>(&self, points: &[Point3<f64>], scale: S) -> FieldResult<Vec<Vector3<f64>>>
    where
        S: ScaleSource + Clone + Send + Sync,
    {
        use rayon::prelude::*;

        if !self.built {
            return Err(FieldError::MapNotBuilt);
        }
        Ok(points
            .par_iter()
            .map_init(|| FieldQuery::new(self, scale.clone()), |query, p| query.field(p))
            .collect())
    }
}

/// The edge within `tolerance` of `value`, or `value` itself.
fn snap_to_edge(edges: &[f64], value: f64, tolerance: f64) -> f64 {
    let i = edges.partition_point(|&e| e < value);
    [i.checked_sub(1), Some(i)]
        .into_iter()
        .flatten()
        .filter_map(|j| edges.get(j).copied())
        .filter(|e| (e - value).abs() < tolerance)
        .min_by(|a, b| (a - value).abs().total_cmp(&(b - value).abs()))
        .unwrap_or(value)
}
