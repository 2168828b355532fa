//! Core field sample types for CortenForge.
//!
//! This crate provides the foundational types shared by field-map consumers:
//!
//! - [`FieldVector`] - A fixed 3-component field sample, generic over storage
//! - [`FieldScalar`] - Storage types a sample can use (quantized or real)
//! - [`FieldBounds`] - Axis-aligned box with inclusive containment
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. It can be used in:
//! - Simulation and reconstruction jobs
//! - CLI tools
//! - Servers
//! - Python bindings
//!
//! # Units
//!
//! This library is **unit-agnostic**. Coordinates are `f64` in the map's native
//! length unit; stored samples carry whatever unit the map was written in and
//! are converted by a per-zone scale factor downstream.
//!
//! # Example
//!
//! ```
//! use field_types::{FieldBounds, FieldVector, Point3};
//!
//! // A quantized sample, as stored on disk
//! let sample: FieldVector<i16> = FieldVector::new(100, -20, 3);
//! let tesla = sample.scaled(1e-4);
//! assert!((tesla.x - 0.01).abs() < 1e-12);
//!
//! let bounds = FieldBounds::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
//! assert!(bounds.contains(&Point3::new(1.0, 0.0, 0.0))); // max is inclusive
//! assert!(!FieldBounds::empty().contains(&Point3::origin()));
//! ```
//!
//! # Quality Standards
//!
//! This crate maintains A-grade standards:
//! - ≥90% test coverage
//! - Zero clippy/doc warnings
//! - Zero `unwrap`/`expect` in library code

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod bounds;
mod vector;

// Re-export core types
pub use bounds::FieldBounds;
pub use vector::{FieldScalar, FieldVector};

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix3, Point3, Vector3};
