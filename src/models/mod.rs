//! Defines the data structures and models used throughout the interpolation engine.
//!
//! Mirrors the data model in the specification: sensors and raw measurements,
//! cadence labels and the elected global interval, grid points and kelurahan
//! polygons, and the per-timestamp result/provenance rows written to disk.

mod cadence;
mod grid;
mod kelurahan;
mod measurement;
mod result;
mod sensor;

pub use cadence::{CadenceLabel, Interval};
pub use grid::GridPoint;
pub use kelurahan::Kelurahan;
pub use measurement::{NormalizedMeasurement, RawMeasurement};
pub use result::{DistanceResult, KelurahanResult, TimestampType};
pub use sensor::Sensor;
