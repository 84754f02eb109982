//! Output row types (spec §3, §6).

/// One row of the primary output: a kelurahan's aggregated prediction for a
/// single accepted timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct KelurahanResult {
    pub kelurahan_name: String,
    /// Stata `%tc` milliseconds since 1960-01-01 00:00:00 UTC.
    pub timestamp_ms: i64,
    pub avg_pm25: f64,
    pub min_pm25: f64,
    pub max_pm25: f64,
    pub n_grids: usize,
    pub n_sensors_used: usize,
    pub n_contributing_sensors: usize,
}

/// Tags the three representative timestamps selected for distance reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimestampType {
    MaxSensors,
    MinSensors,
    MedianSensors,
}

impl TimestampType {
    pub fn as_str(self) -> &'static str {
        match self {
            TimestampType::MaxSensors => "max_sensors",
            TimestampType::MinSensors => "min_sensors",
            TimestampType::MedianSensors => "median_sensors",
        }
    }
}

/// One row of the distance-metrics output, emitted only for the three
/// representative timestamps (spec §4.9).
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceResult {
    pub kelurahan_name: String,
    pub timestamp_type: TimestampType,
    pub timestamp_ms: i64,
    pub avg_pm25: f64,
    pub min_pm25: f64,
    pub max_pm25: f64,
    pub min_distance_km: f64,
    pub median_distance_km: f64,
    pub avg_distance_km: f64,
    pub max_distance_km: f64,
    pub n_grids: usize,
    pub n_sensors_used: usize,
    pub n_contributing_sensors: usize,
}
