//! Cadence Classifier (spec §4.2).

use std::collections::HashMap;

use chrono::Timelike;

use crate::config::IntervalTiePolicy;
use crate::models::{CadenceLabel, Interval, RawMeasurement};

/// Per-label sensor counts, emitted as a summary table (spec §4.2).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CadenceSummary {
    pub thirty: usize,
    pub hourly: usize,
    pub mixed: usize,
    pub other: usize,
    pub total: usize,
}

/// Classifies every sensor present in `measurements` and returns both the
/// per-sensor label map and the aggregate summary.
pub fn classify_all(measurements: &[RawMeasurement]) -> (HashMap<String, CadenceLabel>, CadenceSummary) {
    let mut half_hour_total: HashMap<&str, u32> = HashMap::new();
    let mut half_hour_valid: HashMap<&str, u32> = HashMap::new();
    let mut sensor_ids: Vec<&str> = Vec::new();

    for m in measurements {
        if !half_hour_total.contains_key(m.sensor_id.as_str()) {
            sensor_ids.push(m.sensor_id.as_str());
        }
        if m.datetime.minute() == 30 {
            *half_hour_total.entry(m.sensor_id.as_str()).or_insert(0) += 1;
            if m.pm25.is_some() {
                *half_hour_valid.entry(m.sensor_id.as_str()).or_insert(0) += 1;
            }
        } else {
            half_hour_total.entry(m.sensor_id.as_str()).or_insert(0);
        }
    }

    let mut labels = HashMap::new();
    let mut summary = CadenceSummary::default();
    for sensor_id in sensor_ids {
        let total = *half_hour_total.get(sensor_id).unwrap_or(&0);
        let valid = *half_hour_valid.get(sensor_id).unwrap_or(&0);
        let label = if total == 0 {
            CadenceLabel::Other
        } else {
            CadenceLabel::from_fraction(valid as f64 / total as f64)
        };
        match label {
            CadenceLabel::Thirty => summary.thirty += 1,
            CadenceLabel::Hourly => summary.hourly += 1,
            CadenceLabel::Mixed => summary.mixed += 1,
            CadenceLabel::Other => summary.other += 1,
        }
        summary.total += 1;
        labels.insert(sensor_id.to_string(), label);
    }
    (labels, summary)
}

/// Elects the single global interval Δ for the whole run (spec §3, §4.2).
/// A strict majority wins; a tie resolves per `tie_policy` (the spec's
/// hard default, "ties resolve to 60 min", is `IntervalTiePolicy::PreferHourly`).
pub fn elect_interval(summary: &CadenceSummary, tie_policy: IntervalTiePolicy) -> Interval {
    match summary.thirty.cmp(&summary.hourly) {
        std::cmp::Ordering::Greater => Interval::Thirty,
        std::cmp::Ordering::Less => Interval::Sixty,
        std::cmp::Ordering::Equal => match tie_policy {
            IntervalTiePolicy::PreferHourly => Interval::Sixty,
            IntervalTiePolicy::PreferThirty => Interval::Thirty,
        },
    }
}
