//! Polygon Aggregator (spec §4.8).

use std::collections::{HashMap, HashSet};

use crate::idw::GridPrediction;
use crate::models::{Kelurahan, KelurahanResult};

/// Groups IDW predictions by polygon using the precomputed grid-to-polygon
/// map, and emits one aggregated row per polygon with at least one grid
/// point. Polygons with none are omitted (logged once, at grid-build time).
pub fn aggregate_polygons(
    predictions: &[GridPrediction],
    grid_by_polygon: &HashMap<usize, Vec<usize>>,
    kelurahan: &[Kelurahan],
    active_sensor_count: usize,
    timestamp_ms: i64,
) -> Vec<KelurahanResult> {
    let mut rows = Vec::with_capacity(grid_by_polygon.len());

    for (&polygon_idx, grid_ids) in grid_by_polygon {
        if grid_ids.is_empty() {
            continue;
        }
        let values: Vec<f64> = grid_ids.iter().map(|&id| predictions[id].value).collect();
        let mut contributing: HashSet<&str> = HashSet::new();
        for &id in grid_ids {
            contributing.extend(predictions[id].contributors.iter().map(|s| s.as_str()));
        }

        let avg = values.iter().sum::<f64>() / values.len() as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        rows.push(KelurahanResult {
            kelurahan_name: kelurahan[polygon_idx].name.clone(),
            timestamp_ms,
            avg_pm25: avg,
            min_pm25: min,
            max_pm25: max,
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
    use geo::{polygon, BoundingRect, MultiPolygon, Polygon};

    fn kelurahan(index: usize, name: &str) -> Kelurahan {
        let polygon: Polygon<f64> = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0), (x: 0.0, y: 0.0)];
        let multi_polygon = MultiPolygon::new(vec![polygon]);
        let bbox = multi_polygon.bounding_rect().unwrap();
        Kelurahan { index, name: name.to_string(), polygon: multi_polygon, bbox }
    }

    fn prediction(grid_id: usize, polygon_idx: usize, value: f64, contributors: &[&str]) -> GridPrediction {
        GridPrediction { grid_id, polygon_idx, value, contributors: contributors.iter().map(|s| s.to_string()).collect() }
    }

    #[test]
    fn aggregates_min_avg_max_and_union_of_contributors() {
        let predictions =
            vec![prediction(0, 0, 10.0, &["a", "b"]), prediction(1, 0, 20.0, &["b", "c"]), prediction(2, 0, 30.0, &["c"])];
        let mut grid_by_polygon = HashMap::new();
        grid_by_polygon.insert(0usize, vec![0, 1, 2]);
        let kelurahan_table = vec![kelurahan(0, "Menteng")];

        let rows = aggregate_polygons(&predictions, &grid_by_polygon, &kelurahan_table, 3, 0);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.kelurahan_name, "Menteng");
        assert_eq!(row.min_pm25, 10.0);
        assert_eq!(row.max_pm25, 30.0);
        assert!((row.avg_pm25 - 20.0).abs() < 1e-9);
        assert_eq!(row.n_grids, 3);
        assert_eq!(row.n_sensors_used, 3);
        assert_eq!(row.n_contributing_sensors, 3);
    }

    #[test]
    fn omits_polygons_with_no_grid_points() {
        let predictions = vec![prediction(0, 0, 10.0, &["a"])];
        let mut grid_by_polygon = HashMap::new();
        grid_by_polygon.insert(0usize, vec![0]);
        grid_by_polygon.insert(1usize, vec![]);
        let kelurahan_table = vec![kelurahan(0, "Menteng"), kelurahan(1, "Empty")];

        let rows = aggregate_polygons(&predictions, &grid_by_polygon, &kelurahan_table, 1, 0);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kelurahan_name, "Menteng");
    }
}
