//! Error types for field-map construction.
//!
//! Queries never fail: points outside coverage get the fallback field. Every
//! variant here is raised while a map is being loaded or its lookup tables
//! are being built.

use thiserror::Error;

/// Result type for field-map operations.
pub type FieldResult<T> = Result<T, FieldError>;

/// Errors that can occur while building a field map.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FieldError {
    /// An axis of a mesh has no break-points.
    #[error("mesh axis {axis} has no break-points")]
    EmptyAxis {
        /// Axis index (0 = x, 1 = y, 2 = z).
        axis: usize,
    },

    /// The number of field samples does not match the mesh dimensions.
    #[error("sample count mismatch: mesh needs {expected} samples, got {got}")]
    SampleCountMismatch {
        /// `nx * ny * nz` from the mesh break-points.
        expected: usize,
        /// Number of samples appended.
        got: usize,
    },

    /// Mesh break-points are not strictly increasing.
    #[error("mesh axis {axis} is not strictly increasing at break-point {index}")]
    NonMonotonicAxis {
        /// Axis index.
        axis: usize,
        /// Index of the first offending break-point.
        index: usize,
    },

    /// The declared box is inverted or not finite.
    #[error("invalid bounds: min {min:?} max {max:?}")]
    InvalidBounds {
        /// Declared minimum corner.
        min: [f64; 3],
        /// Declared maximum corner.
        max: [f64; 3],
    },

    /// A mesh axis has fewer than two break-points or zero width.
    #[error("degenerate mesh on axis {axis}: {points} break-point(s), width {width}")]
    DegenerateMesh {
        /// Axis index.
        axis: usize,
        /// Number of break-points on the axis.
        points: usize,
        /// Declared width of the axis.
        width: f64,
    },

    /// Lookup tables were requested for a map with no zones.
    #[error("field map has no zones")]
    EmptyMap,

    /// A unit scale or rescale factor is not finite.
    #[error("scale factor must be finite, got {0}")]
    InvalidScale(f64),

    /// A query was requested before the map lookup tables were built.
    #[error("field map lookup tables have not been built")]
    MapNotBuilt,

    /// A zone failed validation.
    #[error("zone {id}: {source}")]
    Zone {
        /// Identifier of the offending zone.
        id: i32,
        /// The underlying mesh error.
        #[source]
        source: Box<FieldError>,
    },
}

impl FieldError {
    /// Attach a zone identifier to a mesh-level error.
    #[must_use]
    pub fn in_zone(self, id: i32) -> Self {
        Self::Zone {
            id,
            source: Box::new(self),
        }
    }

    /// Returns true if this error describes a malformed map record.
    ///
    /// Malformed records are missing axis data, carry the wrong number of
    /// samples, or declare an unusable box.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        match self {
            Self::EmptyAxis { .. }
            | Self::SampleCountMismatch { .. }
            | Self::NonMonotonicAxis { .. }
            | Self::InvalidBounds { .. } => true,
            Self::Zone { source, .. } => source.is_malformed(),
            _ => false,
        }
    }

    /// Returns true if this error describes a degenerate (zero-width) mesh.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        match self {
            Self::DegenerateMesh { .. } => true,
            Self::Zone { source, .. } => source.is_degenerate(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_context_in_message() {
        let err = FieldError::EmptyAxis { axis: 2 }.in_zone(7);
        assert_eq!(err.to_string(), "zone 7: mesh axis 2 has no break-points");
        assert!(err.is_malformed());
        assert!(!err.is_degenerate());
    }

    #[test]
    fn degenerate_classification() {
        let err = FieldError::DegenerateMesh {
            axis: 0,
            points: 1,
            width: 0.0,
        }
        .in_zone(3);
        assert!(err.is_degenerate());
        assert!(!err.is_malformed());
    }

    #[test]
    fn sample_mismatch_message() {
        let err = FieldError::SampleCountMismatch {
            expected: 8,
            got: 7,
        };
        assert_eq!(
            err.to_string(),
            "sample count mismatch: mesh needs 8 samples, got 7"
        );
    }
}
