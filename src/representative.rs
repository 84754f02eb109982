//! Representative-Timestamp Distance Reporter (spec §4.9).

use std::collections::{HashMap, HashSet};

use crate::idw::GridPrediction;
use crate::models::{DistanceResult, GridPoint, Kelurahan, TimestampType};
use crate::spatial::great_circle_km;

/// Selects the three representative timestamps by active-sensor count
/// (spec §4.9, invariant I5): max, min, and median (upper median on ties,
/// tie-broken by earliest timestamp for determinism — P9).
pub fn select_representative(counts: &[(i64, usize)]) -> HashMap<TimestampType, i64> {
    let mut sorted: Vec<(i64, usize)> = counts.to_vec();
    sorted.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));

    let mut selected = HashMap::new();
    if let Some(&(ts, _)) = sorted.first() {
        selected.insert(TimestampType::MinSensors, ts);
    }
    if let Some(&(ts, _)) = sorted.last() {
        selected.insert(TimestampType::MaxSensors, ts);
    }
    if !sorted.is_empty() {
        let idx = sorted.len() / 2;
        selected.insert(TimestampType::MedianSensors, sorted[idx].0);
    }
    selected
}

/// Builds distance-metrics rows for one representative timestamp: per
/// polygon, the min/median/mean/max great-circle distance from each of its
/// grid points to that grid point's contributing sensors (`N_i`).
pub fn build_distance_rows(
    timestamp_type: TimestampType,
    timestamp_ms: i64,
    predictions: &[GridPrediction],
    grid_by_polygon: &HashMap<usize, Vec<usize>>,
    grid_points: &[GridPoint],
    kelurahan: &[Kelurahan],
    sensor_positions: &HashMap<String, (f64, f64)>,
    active_sensor_count: usize,
) -> Vec<DistanceResult> {
    let mut rows = Vec::new();

    for (&polygon_idx, grid_ids) in grid_by_polygon {
        if grid_ids.is_empty() {
            continue;
        }
        let values: Vec<f64> = grid_ids.iter().map(|&id| predictions[id].value).collect();
        let mut contributing: HashSet<&str> = HashSet::new();
        let mut distances = Vec::new();
        for &id in grid_ids {
            let g = &grid_points[id];
            for sensor_id in &predictions[id].contributors {
                contributing.insert(sensor_id.as_str());
                if let Some(&(lon, lat)) = sensor_positions.get(sensor_id) {
                    distances.push(great_circle_km(g.longitude, g.latitude, lon, lat));
                }
            }
        }
        if distances.is_empty() {
            continue;
        }
        distances.sort_by(|a, b| a.partial_cmp(b).expect("distances are finite"));

        let avg = values.iter().sum::<f64>() / values.len() as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        rows.push(DistanceResult {
            kelurahan_name: kelurahan[polygon_idx].name.clone(),
            timestamp_type,
            timestamp_ms,
            avg_pm25: avg,
            min_pm25: min,
            max_pm25: max,
            min_distance_km: distances[0],
            median_distance_km: distances[distances.len() / 2],
            avg_distance_km: distances.iter().sum::<f64>() / distances.len() as f64,
            max_distance_km: *distances.last().expect("non-empty"),
            n_grids: grid_ids.len(),
            n_sensors_used: active_sensor_count,
            n_contributing_sensors: contributing.len(),
        });
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_max_min_and_median_by_active_count() {
        let counts = vec![(100, 100), (200, 80), (300, 60), (400, 55), (500, 50)];
        let selected = select_representative(&counts);
        assert_eq!(selected[&TimestampType::MaxSensors], 100);
        assert_eq!(selected[&TimestampType::MinSensors], 500);
        assert_eq!(selected[&TimestampType::MedianSensors], 300);
    }

    #[test]
    fn upper_median_on_even_length() {
        let counts = vec![(1, 10), (2, 20), (3, 30), (4, 40)];
        let selected = select_representative(&counts);
        // sorted ascending: 10,20,30,40 -> index 4/2=2 -> value 30 (ts=3)
        assert_eq!(selected[&TimestampType::MedianSensors], 3);
    }

    #[test]
    fn exactly_three_distinct_timestamp_types_are_produced() {
        let counts = vec![(1, 10), (2, 20), (3, 30)];
        let selected = select_representative(&counts);
        assert_eq!(selected.len(), 3);
    }
}
