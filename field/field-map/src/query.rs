//! Per-caller field query context.
//!
//! A [`FieldQuery`] owns one [`FieldCache`] and answers repeated queries
//! along a track or trajectory. Each worker should own its own query; the
//! underlying [`FieldMap`] is shared read-only.
//!
//! # Cache lifecycle
//!
//! ```text
//! Empty --first query--> Valid(cell)
//! Valid(cell) --query inside cell--> Valid(cell)        (hit)
//! Valid(cell) --query elsewhere--> Valid(cell')         (miss, refill)
//! any --query outside coverage--> unchanged             (fallback field)
//! ```
//!
//! The scale factor is read from the [`ScaleSource`] only on a miss. A hit
//! keeps using the factor in effect when its cell was filled, even if the
//! source has moved on since; [`FieldQuery::cached_scale`] reports which one.

use field_types::FieldScalar;
use nalgebra::{Matrix3, Point3, Vector3};

use crate::cache::FieldCache;
use crate::map::FieldMap;
use crate::scale::{ScaleFactor, ScaleSource};

/// Cache hit/miss counters for one query context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Queries answered from the cached cell.
    pub hits: u64,
    /// Queries that refilled the cache.
    pub misses: u64,
    /// Queries outside map coverage.
    pub outside: u64,
}

impl CacheStats {
    /// Total number of queries.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.hits + self.misses + self.outside
    }

    /// Fraction of queries answered from the cache, or 0 with no queries.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Counts stay far below 2^52
    pub fn hit_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Field query context owning a single-cell cache.
///
/// # Example
///
/// ```
/// use field_map::{FieldMap, FieldMapConfig, SharedScaleFactor, Zone};
/// use field_types::{FieldBounds, FieldVector};
/// use nalgebra::{Point3, Vector3};
///
/// let mut zone = Zone::new(0, FieldBounds::from_extents([0.0, 1.0], [0.0, 1.0], [0.0, 1.0]), 1.0);
/// for axis in 0..3 {
///     zone.append_mesh(axis, 0.0);
///     zone.append_mesh(axis, 1.0);
/// }
/// for _ in 0..8 {
///     zone.append_field(FieldVector::new(1_i16, 0, 0));
/// }
/// let mut map = FieldMap::new(FieldMapConfig::default());
/// map.push_zone(zone);
/// map.build_lut().unwrap();
///
/// let conditions = SharedScaleFactor::new(1.0);
/// let mut query = map.query(conditions.clone()).unwrap();
/// assert_eq!(query.field(&Point3::new(0.25, 0.25, 0.25)), Vector3::new(1.0, 0.0, 0.0));
///
/// // A hit keeps the factor the cell was filled with
/// conditions.set(2.0);
/// assert_eq!(query.field(&Point3::new(0.5, 0.25, 0.25)), Vector3::new(1.0, 0.0, 0.0));
///
/// query.invalidate();
/// assert_eq!(query.field(&Point3::new(0.5, 0.25, 0.25)), Vector3::new(2.0, 0.0, 0.0));
/// ```
#[derive(Debug)]
pub struct FieldQuery<'m, T: FieldScalar = i16, S: ScaleSource = ScaleFactor> {
    map: &'m FieldMap<T>,
    scale: S,
    cache: FieldCache,
    cached_scale: Option<ScaleFactor>,
    stats: CacheStats,
}

impl<'m, T: FieldScalar, S: ScaleSource> FieldQuery<'m, T, S> {
    /// Creates a query context with an empty cache.
    ///
    /// Queries against a map whose lookup tables are not built return the
    /// fallback field.
    #[must_use]
    pub fn new(map: &'m FieldMap<T>, scale: S) -> Self {
        Self {
            map,
            scale,
            cache: FieldCache::default(),
            cached_scale: None,
            stats: CacheStats::default(),
        }
    }

    /// Make sure the cache covers `p`, refilling it on a miss.
    ///
    /// Returns false if `p` is outside coverage; the cache is then left
    /// unchanged.
    #[inline]
    fn ensure_cached(&mut self, p: &Point3<f64>) -> bool {
        if self.cache.contains(p) {
            self.stats.hits += 1;
            return true;
        }

        let Some(zone) = self.map.find_zone(p) else {
            self.stats.outside += 1;
            return false;
        };
        let factor = self.scale.current();
        match zone.cache_at(p, factor.value) {
            Some(cache) => {
                self.cache = cache;
                self.cached_scale = Some(factor);
                self.stats.misses += 1;
                true
            }
            None => {
                self.stats.outside += 1;
                false
            }
        }
    }

    /// Field at `p`.
    ///
    /// Points outside every zone get the map's fallback field.
    #[inline]
    pub fn field(&mut self, p: &Point3<f64>) -> Vector3<f64> {
        if self.ensure_cached(p) {
            self.cache.field(p)
        } else {
            self.map.fallback_field()
        }
    }

    /// Field at `p` and its gradient, `gradient[(i, j)] = ∂B_i/∂x_j`.
    ///
    /// Points outside every zone get the fallback field and a zero gradient.
    pub fn field_with_gradient(&mut self, p: &Point3<f64>) -> (Vector3<f64>, Matrix3<f64>) {
        if self.ensure_cached(p) {
            self.cache.field_with_gradient(p)
        } else {
            (self.map.fallback_field(), Matrix3::zeros())
        }
    }

    /// Evaluate the field at each of `points`, writing into `out`.
    ///
    /// `out` is cleared first. Consecutive nearby points share the cache.
    pub fn fill_fields(&mut self, points: &[Point3<f64>], out: &mut Vec<Vector3<f64>>) {
        out.clear();
        out.reserve(points.len());
        for p in points {
            out.push(self.field(p));
        }
    }

    /// Drop the cached cell; the next query refills it.
    pub fn invalidate(&mut self) {
        self.cache.clear();
        self.cached_scale = None;
    }

    /// Replace the scale source.
    ///
    /// The cached cell is kept, so hits continue with the previous factor
    /// until the next miss or [`FieldQuery::invalidate`].
    pub fn set_scale_source(&mut self, scale: S) {
        self.scale = scale;
    }

    /// The scale source.
    #[must_use]
    pub const fn scale_source(&self) -> &S {
        &self.scale
    }

    /// Scale factor the cached cell was filled with, if any.
    #[must_use]
    pub const fn cached_scale(&self) -> Option<ScaleFactor> {
        self.cached_scale
    }

    /// The cached cell.
    #[must_use]
    pub const fn cache(&self) -> &FieldCache {
        &self.cache
    }

    /// Hit/miss counters since creation or the last [`FieldQuery::reset_stats`].
    #[must_use]
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Zero the hit/miss counters.
    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    /// The map being queried.
    #[must_use]
    pub const fn map(&self) -> &'m FieldMap<T> {
        self.map
    }
}
