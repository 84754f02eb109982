//! Completeness Filter (spec §4.5).

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};

use crate::models::NormalizedMeasurement;

/// Per-timestamp active-sensor readings, keyed by the rounded timestamp.
pub type ActiveSensorMap = HashMap<i64, Vec<(String, f64)>>;

/// Groups normalized (and imputed) measurements by timestamp, then keeps
/// only timestamps with at least `s_min` sensors reporting a non-null
/// reading. Returns the accepted map plus the count of timestamps dropped
/// for insufficient coverage, for the run summary.
pub fn filter_complete(measurements: &[NormalizedMeasurement], s_min: u32) -> (ActiveSensorMap, usize) {
    let mut by_timestamp: HashMap<i64, Vec<(String, f64)>> = HashMap::new();
    for m in measurements {
        if let Some(pm25) = m.pm25 {
            by_timestamp.entry(m.timestamp.timestamp()).or_default().push((m.sensor_id.clone(), pm25));
        }
    }

    let mut accepted = HashMap::new();
    let mut dropped = 0usize;
    for (ts, readings) in by_timestamp {
        if readings.len() >= s_min as usize {
            accepted.insert(ts, readings);
        } else {
            dropped += 1;
        }
    }
    (accepted, dropped)
}

/// Converts an accepted map's key back to a `DateTime<FixedOffset>`, reusing
/// `tz` (all timestamps in a run share the fixed Jakarta offset).
pub fn timestamp_from_epoch(epoch_secs: i64, tz: FixedOffset) -> DateTime<FixedOffset> {
    use chrono::TimeZone;
    tz.timestamp_opt(epoch_secs, 0).single().expect("epoch seconds round-trip unambiguously")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn jkt() -> FixedOffset {
        FixedOffset::east_opt(7 * 3600).unwrap()
    }

    fn dt(minute: u32) -> DateTime<FixedOffset> {
        jkt().with_ymd_and_hms(2024, 1, 1, 10, minute, 0).unwrap()
    }

    #[test]
    fn drops_timestamps_below_s_min() {
        let measurements = vec![
            NormalizedMeasurement { sensor_id: "A".into(), timestamp: dt(0), pm25: Some(10.0) },
            NormalizedMeasurement { sensor_id: "B".into(), timestamp: dt(0), pm25: Some(20.0) },
            NormalizedMeasurement { sensor_id: "A".into(), timestamp: dt(30), pm25: Some(10.0) },
        ];
        let (accepted, dropped) = filter_complete(&measurements, 2);
        assert_eq!(accepted.len(), 1);
        assert!(accepted.contains_key(&dt(0).timestamp()));
        assert_eq!(dropped, 1);
    }

    #[test]
    fn ignores_missing_readings_when_counting() {
        let measurements = vec![
            NormalizedMeasurement { sensor_id: "A".into(), timestamp: dt(0), pm25: None },
            NormalizedMeasurement { sensor_id: "B".into(), timestamp: dt(0), pm25: Some(20.0) },
        ];
        let (accepted, dropped) = filter_complete(&measurements, 2);
        assert!(accepted.is_empty());
        assert_eq!(dropped, 1);
    }
}
