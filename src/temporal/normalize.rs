//! Temporal Normalizer (spec §4.3).

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, TimeZone};

use crate::models::{Interval, NormalizedMeasurement, RawMeasurement};

/// Rounds a timestamp to the nearest multiple of `interval`, ties rounding up
/// (half-up), using whole-second epoch arithmetic so the result is exact
/// regardless of wall-clock offset.
pub fn round_to_interval(dt: DateTime<FixedOffset>, interval: Interval) -> DateTime<FixedOffset> {
    let step_secs = interval.minutes() * 60;
    let ts = dt.timestamp();
    let rounded = (ts + step_secs / 2).div_euclid(step_secs) * step_secs;
    dt.timezone().timestamp_opt(rounded, 0).single().expect("rounded timestamp is unambiguous")
}

/// Output of normalization: the deduplicated, rounded measurement set and
/// the complete regular time axis `T` it spans.
pub struct NormalizeOutcome {
    pub measurements: Vec<NormalizedMeasurement>,
    pub axis: Vec<DateTime<FixedOffset>>,
}

/// Rounds and deduplicates `(sensor_id, t_k)` buckets, then builds the
/// complete regular axis `T` spanning `[t_min, t_max]` at the elected
/// interval.
///
/// At Δ=30min, a bucket resolves to its first non-missing reading (spec
/// §4.3). At Δ=60min, §4.4 overrides this: a bucket resolves to the mean of
/// its non-null readings, since every sensor is hour-aggregated regardless
/// of its native cadence.
pub fn normalize(raw: &[RawMeasurement], interval: Interval) -> NormalizeOutcome {
    let mut buckets: BTreeMap<(String, i64), (DateTime<FixedOffset>, Vec<Option<f64>>)> = BTreeMap::new();

    for m in raw {
        let t_k = round_to_interval(m.datetime, interval);
        let key = (m.sensor_id.clone(), t_k.timestamp());
        buckets.entry(key).or_insert_with(|| (t_k, Vec::new())).1.push(m.pm25);
    }

    let measurements: Vec<NormalizedMeasurement> = buckets
        .into_iter()
        .map(|((sensor_id, _), (t_k, readings))| {
            let pm25 = resolve_bucket(&readings, interval);
            NormalizedMeasurement { sensor_id, timestamp: t_k, pm25 }
        })
        .collect();

    let axis = build_axis(&measurements, interval);
    NormalizeOutcome { measurements, axis }
}

fn resolve_bucket(readings: &[Option<f64>], interval: Interval) -> Option<f64> {
    match interval {
        Interval::Thirty => readings.iter().find_map(|r| *r),
        Interval::Sixty => {
            let valid: Vec<f64> = readings.iter().filter_map(|r| *r).collect();
            if valid.is_empty() {
                None
            } else {
                Some(valid.iter().sum::<f64>() / valid.len() as f64)
            }
        },
    }
}

fn build_axis(measurements: &[NormalizedMeasurement], interval: Interval) -> Vec<DateTime<FixedOffset>> {
    let Some(t_min) = measurements.iter().map(|m| m.timestamp).min() else {
        return Vec::new();
    };
    let t_max = measurements.iter().map(|m| m.timestamp).max().expect("non-empty, t_min exists");

    let step_secs = interval.minutes() * 60;
    let mut axis = Vec::new();
    let mut cursor = t_min.timestamp();
    let end = t_max.timestamp();
    while cursor <= end {
        axis.push(t_min.timezone().timestamp_opt(cursor, 0).single().expect("axis timestamp is unambiguous"));
        cursor += step_secs;
    }
    axis
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn jkt() -> FixedOffset {
        FixedOffset::east_opt(7 * 3600).unwrap()
    }

    fn dt(minute: u32, second: u32) -> DateTime<FixedOffset> {
        jkt().with_ymd_and_hms(2024, 1, 1, 10, minute, second).unwrap()
    }

    #[test]
    fn rounds_to_nearest_half_hour() {
        assert_eq!(round_to_interval(dt(12, 0), Interval::Thirty), dt(0, 0));
        assert_eq!(round_to_interval(dt(14, 59), Interval::Thirty), dt(0, 0));
        assert_eq!(round_to_interval(dt(15, 0), Interval::Thirty), dt(30, 0));
        assert_eq!(round_to_interval(dt(16, 0), Interval::Thirty), dt(30, 0));
    }

    #[test]
    fn rounds_to_nearest_hour() {
        let base = jkt().with_ymd_and_hms(2024, 1, 1, 10, 29, 0).unwrap();
        let rounded = round_to_interval(base, Interval::Sixty);
        assert_eq!(rounded, jkt().with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap());

        let base = jkt().with_ymd_and_hms(2024, 1, 1, 10, 30, 0).unwrap();
        let rounded = round_to_interval(base, Interval::Sixty);
        assert_eq!(rounded, jkt().with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap());
    }

    #[test]
    fn dedup_keeps_first_non_missing() {
        let raw = vec![
            RawMeasurement { sensor_id: "A".into(), datetime: dt(0, 0), pm25: None },
            RawMeasurement { sensor_id: "A".into(), datetime: dt(0, 1), pm25: Some(12.0) },
            RawMeasurement { sensor_id: "A".into(), datetime: dt(0, 2), pm25: Some(99.0) },
        ];
        let out = normalize(&raw, Interval::Thirty);
        assert_eq!(out.measurements.len(), 1);
        assert_eq!(out.measurements[0].pm25, Some(12.0));
    }

    #[test]
    fn sixty_min_bucket_averages_non_null_readings() {
        let raw = vec![
            RawMeasurement { sensor_id: "A".into(), datetime: dt(0, 0), pm25: Some(10.0) },
            RawMeasurement { sensor_id: "A".into(), datetime: dt(10, 0), pm25: None },
            RawMeasurement { sensor_id: "A".into(), datetime: dt(20, 0), pm25: Some(20.0) },
        ];
        let out = normalize(&raw, Interval::Sixty);
        assert_eq!(out.measurements.len(), 1);
        assert_eq!(out.measurements[0].pm25, Some(15.0));
    }

    #[test]
    fn axis_spans_min_to_max_at_step() {
        let raw = vec![
            RawMeasurement { sensor_id: "A".into(), datetime: dt(0, 0), pm25: Some(1.0) },
            RawMeasurement { sensor_id: "A".into(), datetime: dt(30, 0), pm25: Some(2.0) },
            RawMeasurement { sensor_id: "A".into(), datetime: jkt().with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(), pm25: Some(3.0) },
        ];
        let out = normalize(&raw, Interval::Thirty);
        assert_eq!(out.axis.len(), 5);
        assert_eq!(out.axis.first().copied(), Some(dt(0, 0)));
        assert_eq!(out.axis.last().copied(), Some(jkt().with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()));
    }
}
