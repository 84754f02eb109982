//! Measurement tuples, before and after temporal normalization (spec §3).

use chrono::{DateTime, FixedOffset};

/// `(sensor_id, datetime, pm25)` as produced by the loader, after coercion
/// and the missing-value conventions (`0` and `>cap` become `None`).
///
/// `datetime` is always a Jakarta-local wall clock (fixed UTC+07:00, no
/// DST) — never `Utc` — so the "local time, no zone stored" contract is
/// enforced by the type rather than documented.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMeasurement {
    pub sensor_id: String,
    pub datetime: DateTime<FixedOffset>,
    pub pm25: Option<f64>,
}

/// `(sensor_id, t_k, pm25)` after rounding to the elected interval and
/// deduplication within a sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMeasurement {
    pub sensor_id: String,
    pub timestamp: DateTime<FixedOffset>,
    pub pm25: Option<f64>,
}
