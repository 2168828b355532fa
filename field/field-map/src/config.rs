//! Configuration for field-map construction and queries.
//!
//! # Presets
//!
//! - [`FieldMapConfig::default()`] - 1e-6 edge tolerance, no rescalable zone
//! - [`FieldMapConfig::with_dipole()`] - Default settings with one rescalable zone
//!
//! # Example
//!
//! ```
//! use field_map::FieldMapConfig;
//! use nalgebra::Vector3;
//!
//! let config = FieldMapConfig::with_dipole(4)
//!     .with_edge_tolerance(1e-5)
//!     .with_fallback_field(Vector3::zeros());
//!
//! assert_eq!(config.rescalable_zone, Some(4));
//! assert_eq!(config.edge_tolerance, 1e-5);
//! ```

use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default tolerance for merging zone edges, in the map's length unit.
pub const DEFAULT_EDGE_TOLERANCE: f64 = 1e-6;

/// Default field magnitude returned outside map coverage.
///
/// Nonzero so callers that normalize the field direction never divide by zero.
pub const DEFAULT_FALLBACK_FIELD: f64 = 1e-14;

/// Settings that control how a field map is built and queried.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldMapConfig {
    /// Zone boundaries closer than this are merged into one shared edge.
    pub edge_tolerance: f64,

    /// Field returned for points not covered by any zone.
    pub fallback_field: Vector3<f64>,

    /// Identifier of the one zone that may be rescaled at run time.
    pub rescalable_zone: Option<i32>,
}

impl Default for FieldMapConfig {
    fn default() -> Self {
        Self {
            edge_tolerance: DEFAULT_EDGE_TOLERANCE,
            fallback_field: Vector3::new(0.0, 0.0, DEFAULT_FALLBACK_FIELD),
            rescalable_zone: None,
        }
    }
}

impl FieldMapConfig {
    /// Default settings with `zone_id` marked as the rescalable (dipole) zone.
    #[must_use]
    pub fn with_dipole(zone_id: i32) -> Self {
        Self {
            rescalable_zone: Some(zone_id),
            ..Default::default()
        }
    }

    /// Set the edge merge tolerance.
    ///
    /// Negative or non-finite values fall back to [`DEFAULT_EDGE_TOLERANCE`].
    #[must_use]
    pub fn with_edge_tolerance(mut self, tolerance: f64) -> Self {
        self.edge_tolerance = if tolerance.is_finite() && tolerance >= 0.0 {
            tolerance
        } else {
            DEFAULT_EDGE_TOLERANCE
        };
        self
    }

    /// Set the outside-coverage field.
    #[must_use]
    pub fn with_fallback_field(mut self, field: Vector3<f64>) -> Self {
        self.fallback_field = field;
        self
    }

    /// Set (or clear) the rescalable zone identifier.
    #[must_use]
    pub fn with_rescalable_zone(mut self, zone_id: Option<i32>) -> Self {
        self.rescalable_zone = zone_id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = FieldMapConfig::default();
        assert_eq!(config.edge_tolerance, 1e-6);
        assert_eq!(config.fallback_field, Vector3::new(0.0, 0.0, 1e-14));
        assert!(config.rescalable_zone.is_none());
    }

    #[test]
    fn fallback_is_nonzero() {
        assert!(FieldMapConfig::default().fallback_field.norm() > 0.0);
    }

    #[test]
    fn invalid_tolerance_is_ignored() {
        let config = FieldMapConfig::default().with_edge_tolerance(-1.0);
        assert_eq!(config.edge_tolerance, DEFAULT_EDGE_TOLERANCE);
        let config = FieldMapConfig::default().with_edge_tolerance(f64::NAN);
        assert_eq!(config.edge_tolerance, DEFAULT_EDGE_TOLERANCE);
    }

    #[test]
    fn builder_chain() {
        let config = FieldMapConfig::with_dipole(2)
            .with_rescalable_zone(None)
            .with_fallback_field(Vector3::x());
        assert!(config.rescalable_zone.is_none());
        assert_eq!(config.fallback_field, Vector3::x());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_roundtrip() {
        let config = FieldMapConfig::with_dipole(9);
        let json = serde_json::to_string(&config).expect("serialize");
        let back: FieldMapConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, config);
    }
}
