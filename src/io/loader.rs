//! Loader & Validator (spec §4.1).
//!
//! Reads the prepared measurement table (and, optionally, an authoritative
//! station table) and produces the set of valid sensors plus the raw
//! measurement stream. Never imputes coordinates; drops rows with missing
//! or out-of-bounds coordinates and logs the counts.

use std::collections::HashMap;
use std::path::Path;

use chrono::{FixedOffset, NaiveDateTime};
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::RunConfig;
use crate::error::{PipelineError, Result};
use crate::models::{RawMeasurement, Sensor};

const JAKARTA_OFFSET_SECONDS: i32 = 7 * 3600;

/// Result of §4.1: the measurement stream restricted to valid sensors, plus
/// the valid sensors themselves and counts for the run summary.
pub struct LoadOutcome {
    pub sensors: Vec<Sensor>,
    pub measurements: Vec<RawMeasurement>,
    pub total_rows_read: usize,
    pub excluded_rows: usize,
    pub excluded_sensors: usize,
}

#[derive(Debug, Deserialize)]
struct MeasurementRecord {
    sensor_id: String,
    #[serde(deserialize_with = "deserialize_optional_f64")]
    longitude: Option<f64>,
    #[serde(deserialize_with = "deserialize_optional_f64")]
    latitude: Option<f64>,
    datetime: String,
    #[serde(deserialize_with = "deserialize_optional_f64")]
    pm25: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct StationRecord {
    sensor_id: String,
    #[serde(deserialize_with = "deserialize_optional_f64")]
    longitude: Option<f64>,
    #[serde(deserialize_with = "deserialize_optional_f64")]
    latitude: Option<f64>,
}

fn deserialize_optional_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: String = Deserialize::deserialize(deserializer)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("na") || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|_| serde::de::Error::custom(format!("invalid float {raw:?}")))
}

fn parse_local_datetime(raw: &str) -> Option<chrono::DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(JAKARTA_OFFSET_SECONDS)?;
    const FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
    for fmt in FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw.trim(), fmt) {
            return naive.and_local_timezone(offset).single();
        }
    }
    None
}

/// Resolves each sensor's coordinates from a coordinate-bearing source,
/// keeping the first non-null value and logging a warning on a later
/// conflicting value (spec §9: "first non-null wins").
fn resolve_coordinates<I>(entries: I) -> HashMap<String, (f64, f64)>
where
    I: IntoIterator<Item = (String, Option<f64>, Option<f64>)>,
{
    let mut resolved: HashMap<String, (f64, f64)> = HashMap::new();
    for (sensor_id, lon, lat) in entries {
        let (Some(lon), Some(lat)) = (lon, lat) else { continue };
        match resolved.get(&sensor_id) {
            None => {
                resolved.insert(sensor_id, (lon, lat));
            },
            Some(&(existing_lon, existing_lat)) => {
                if (existing_lon - lon).abs() > 1e-9 || (existing_lat - lat).abs() > 1e-9 {
                    warn!(
                        sensor_id = %sensor_id,
                        existing = ?(existing_lon, existing_lat),
                        conflicting = ?(lon, lat),
                        "sensor has conflicting coordinates; keeping first non-null"
                    );
                }
            },
        }
    }
    resolved
}

/// Loads the measurement table (and optional station table override) into a
/// validated [`LoadOutcome`]. Fatal per spec §4.1/§7: empty input after
/// validation returns `InputShapeError`.
pub fn load(config: &RunConfig) -> Result<LoadOutcome> {
    let records = read_measurement_csv(&config.input_path)?;
    if records.is_empty() {
        return Err(PipelineError::InputShape("measurement table is empty".into()));
    }
    let total_rows_read = records.len();

    let coords = if let Some(stations_path) = &config.stations_path {
        let station_records = read_station_csv(stations_path)?;
        info!(path = %stations_path.display(), count = station_records.len(), "using station table for sensor locations");
        resolve_coordinates(
            station_records
                .into_iter()
                .map(|r| (r.sensor_id, r.longitude, r.latitude)),
        )
    } else {
        resolve_coordinates(
            records
                .iter()
                .map(|r| (r.sensor_id.clone(), r.longitude, r.latitude)),
        )
    };

    let mut sensors: Vec<Sensor> = Vec::new();
    let mut excluded_sensors = 0usize;
    for (sensor_id, (lon, lat)) in &coords {
        let sensor = Sensor { sensor_id: sensor_id.clone(), longitude: *lon, latitude: *lat };
        if sensor.is_valid(&config.bbox) {
            sensors.push(sensor);
        } else {
            excluded_sensors += 1;
        }
    }
    sensors.sort_by(|a, b| a.sensor_id.cmp(&b.sensor_id));

    let valid_ids: std::collections::HashSet<&str> = sensors.iter().map(|s| s.sensor_id.as_str()).collect();

    let mut measurements = Vec::with_capacity(records.len());
    let mut excluded_rows = 0usize;
    for record in records {
        if !valid_ids.contains(record.sensor_id.as_str()) {
            excluded_rows += 1;
            continue;
        }
        let Some(datetime) = parse_local_datetime(&record.datetime) else {
            excluded_rows += 1;
            continue;
        };
        let pm25 = normalize_pm25(record.pm25, config.pm25_cap);
        measurements.push(RawMeasurement { sensor_id: record.sensor_id, datetime, pm25 });
    }

    if sensors.is_empty() || measurements.is_empty() {
        return Err(PipelineError::InputShape(
            "no valid sensors/measurements remain after bounding-box validation".into(),
        ));
    }

    info!(
        total_rows_read,
        excluded_rows,
        sensors_kept = sensors.len(),
        excluded_sensors,
        "loader validation complete"
    );

    Ok(LoadOutcome { sensors, measurements, total_rows_read, excluded_rows, excluded_sensors })
}

/// Applies the missing-value conventions: `0` is a sensor fault, `>cap` is
/// rejected as an outlier. Both become `None` (missing), never an error.
fn normalize_pm25(pm25: Option<f64>, cap: f64) -> Option<f64> {
    match pm25 {
        Some(v) if v.is_finite() && v > 0.0 && v <= cap => Some(v),
        _ => None,
    }
}

fn read_measurement_csv(path: &Path) -> Result<Vec<MeasurementRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut out = Vec::new();
    for result in reader.deserialize() {
        let record: MeasurementRecord = result?;
        out.push(record);
    }
    Ok(out)
}

fn read_station_csv(path: &Path) -> Result<Vec<StationRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut out = Vec::new();
    for result in reader.deserialize() {
        let record: StationRecord = result?;
        out.push(record);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pm25_zero_is_missing() {
        assert_eq!(normalize_pm25(Some(0.0), 500.0), None);
    }

    #[test]
    fn pm25_above_cap_is_missing() {
        assert_eq!(normalize_pm25(Some(501.0), 500.0), None);
    }

    #[test]
    fn pm25_at_cap_is_kept() {
        assert_eq!(normalize_pm25(Some(500.0), 500.0), Some(500.0));
    }

    #[test]
    fn pm25_normal_value_is_kept() {
        assert_eq!(normalize_pm25(Some(35.4), 500.0), Some(35.4));
    }

    #[test]
    fn resolve_coordinates_keeps_first_non_null() {
        let coords = resolve_coordinates(vec![
            ("A".to_string(), Some(106.8), Some(-6.2)),
            ("A".to_string(), Some(106.9), Some(-6.1)),
            ("B".to_string(), None, None),
            ("B".to_string(), Some(106.7), Some(-6.3)),
        ]);
        assert_eq!(coords.get("A"), Some(&(106.8, -6.2)));
        assert_eq!(coords.get("B"), Some(&(106.7, -6.3)));
    }

    #[test]
    fn parses_local_datetime_without_zone() {
        let dt = parse_local_datetime("2024-01-15 10:30:00").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), JAKARTA_OFFSET_SECONDS);
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-01-15 10:30:00");
    }
}
