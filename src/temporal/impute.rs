//! Selective Imputer (spec §4.4).

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, FixedOffset, Timelike};

use crate::models::{CadenceLabel, Interval, NormalizedMeasurement};

/// Fills isolated half-hour gaps for `hourly`/`mixed` sensors when the
/// elected interval is 30 minutes. `thirty`-labeled sensors and the
/// Δ=60min case (already hour-aggregated by [`super::normalize::normalize`])
/// pass through untouched. Returns only the newly imputed rows; callers
/// append them to the normalized set.
pub fn impute(
    normalized: &[NormalizedMeasurement],
    axis: &[DateTime<FixedOffset>],
    labels: &HashMap<String, CadenceLabel>,
    interval: Interval,
) -> Vec<NormalizedMeasurement> {
    if interval != Interval::Thirty {
        return Vec::new();
    }

    let mut known: HashMap<(&str, i64), f64> = HashMap::new();
    for m in normalized {
        if let Some(v) = m.pm25 {
            known.insert((m.sensor_id.as_str(), m.timestamp.timestamp()), v);
        }
    }

    let eligible_sensors: HashSet<&str> = labels
        .iter()
        .filter(|(_, label)| matches!(label, CadenceLabel::Hourly | CadenceLabel::Mixed))
        .map(|(sensor_id, _)| sensor_id.as_str())
        .collect();

    let half_hour_slots: Vec<DateTime<FixedOffset>> = axis.iter().filter(|t| t.minute() == 30).copied().collect();

    let mut filled = Vec::new();
    for sensor_id in eligible_sensors {
        for t in &half_hour_slots {
            let key = (sensor_id, t.timestamp());
            if known.contains_key(&key) {
                continue;
            }
            let prev = *t - chrono::Duration::minutes(30);
            let next = *t + chrono::Duration::minutes(30);
            if let (Some(before), Some(after)) =
                (known.get(&(sensor_id, prev.timestamp())), known.get(&(sensor_id, next.timestamp())))
            {
                filled.push(NormalizedMeasurement {
                    sensor_id: sensor_id.to_string(),
                    timestamp: *t,
                    pm25: Some((before + after) / 2.0),
                });
            }
        }
    }
    filled
}
