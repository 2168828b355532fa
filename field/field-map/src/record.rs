//! Zone records: the load-time interface to map file readers.
//!
//! A file reader produces one [`ZoneRecord`] per zone. Records are plain data
//! and can be deserialized directly when the `serde` feature is enabled.

use field_types::{FieldBounds, FieldScalar, FieldVector};
use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, FieldResult};
use crate::zone::Zone;

/// One zone as read from a field-map file.
///
/// # Example
///
/// ```
/// use field_map::ZoneRecord;
/// use field_types::FieldVector;
///
/// let record = ZoneRecord {
///     id: 3,
///     min: [0.0, 0.0, 0.0],
///     max: [1.0, 1.0, 1.0],
///     unit_scale: 1e-4,
///     mesh: [vec![0.0, 1.0], vec![0.0, 1.0], vec![0.0, 1.0]],
///     samples: vec![FieldVector::new(0_i16, 0, 10_000); 8],
/// };
/// let zone = record.into_zone().unwrap();
/// assert_eq!(zone.id(), 3);
/// assert_eq!(zone.mesh().dimensions(), [2, 2, 2]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ZoneRecord<T> {
    /// Zone identifier.
    pub id: i32,
    /// Declared minimum corner `(xmin, ymin, zmin)`.
    pub min: [f64; 3],
    /// Declared maximum corner `(xmax, ymax, zmax)`.
    pub max: [f64; 3],
    /// Multiplier converting stored samples to field units.
    pub unit_scale: f64,
    /// Break-points along x, y and z.
    pub mesh: [Vec<f64>; 3],
    /// Node samples, x slowest and z fastest.
    pub samples: Vec<FieldVector<T>>,
}

impl<T: FieldScalar> ZoneRecord<T> {
    /// Number of samples the mesh break-points call for.
    #[must_use]
    pub fn expected_samples(&self) -> usize {
        self.mesh.iter().map(Vec::len).product()
    }

    fn validate(&self) -> FieldResult<()> {
        let ordered = (0..3).all(|a| self.min[a] <= self.max[a]);
        let finite = self.min.iter().chain(&self.max).all(|v| v.is_finite());
        if !ordered || !finite {
            return Err(FieldError::InvalidBounds {
                min: self.min,
                max: self.max,
            });
        }
        if !self.unit_scale.is_finite() {
            return Err(FieldError::InvalidScale(self.unit_scale));
        }
        if let Some(axis) = self.mesh.iter().position(Vec::is_empty) {
            return Err(FieldError::EmptyAxis { axis });
        }
        let expected = self.expected_samples();
        if self.samples.len() != expected {
            return Err(FieldError::SampleCountMismatch {
                expected,
                got: self.samples.len(),
            });
        }
        Ok(())
    }

    /// Build a zone from the record.
    ///
    /// The zone still needs its lookup tables built, which
    /// [`FieldMap::build_lut`](crate::FieldMap::build_lut) does for every
    /// zone.
    ///
    /// # Errors
    ///
    /// Returns an error, tagged with the zone id, if the declared box is
    /// inverted or not finite, the unit scale is not finite, an axis has no
    /// break-points, or the sample count does not match the mesh.
    pub fn into_zone(self) -> FieldResult<Zone<T>> {
        self.validate().map_err(|e| e.in_zone(self.id))?;

        let bounds = FieldBounds {
            min: Point3::from(self.min),
            max: Point3::from(self.max),
        };
        let mut zone = Zone::new(self.id, bounds, self.unit_scale);
        let [nx, ny, nz] = [self.mesh[0].len(), self.mesh[1].len(), self.mesh[2].len()];
        zone.reserve(nx, ny, nz);
        for (axis, coords) in self.mesh.into_iter().enumerate() {
            for coord in coords {
                zone.append_mesh(axis, coord);
            }
        }
        for sample in self.samples {
            zone.append_field(sample);
        }
        Ok(zone)
    }
}
