//! IDW Engine (spec §4.7).
//!
//! Neighbor selection uses planar Euclidean distance in degrees — a
//! deliberate approximation justified by the compact study area — never
//! great-circle distance, which is reserved for provenance reporting
//! (spec §4.9, [`crate::spatial::great_circle_km`]).

use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::models::GridPoint;

/// A sensor with a non-null reading at the timestamp being interpolated.
#[derive(Debug, Clone)]
pub struct ActiveSensor {
    pub sensor_id: String,
    pub longitude: f64,
    pub latitude: f64,
    pub pm25: f64,
}

/// The IDW estimate at one grid point, with the contributing sensor ids
/// (`N_i`) kept for polygon-level provenance (spec §4.7 step 3).
#[derive(Debug, Clone)]
pub struct GridPrediction {
    pub grid_id: usize,
    pub polygon_idx: usize,
    pub value: f64,
    pub contributors: Vec<String>,
}

type SensorNode = GeomWithData<[f64; 2], usize>;

/// Runs IDW for every grid point against the active sensor set at one
/// accepted timestamp. Returns one prediction per grid point, indexed in
/// the same order as `grid_points` (so `grid_points[i].id == predictions[i].grid_id`).
pub fn interpolate_timestamp(active: &[ActiveSensor], grid_points: &[GridPoint], k: usize, p: f64) -> Vec<GridPrediction> {
    if active.is_empty() {
        return Vec::new();
    }
    let k_eff = k.min(active.len());
    let tree: RTree<SensorNode> =
        RTree::bulk_load(active.iter().enumerate().map(|(i, a)| GeomWithData::new([a.longitude, a.latitude], i)).collect());

    grid_points.iter().map(|g| predict_one(g, active, &tree, k_eff, p)).collect()
}

fn predict_one(g: &GridPoint, active: &[ActiveSensor], tree: &RTree<SensorNode>, k_eff: usize, p: f64) -> GridPrediction {
    let query = [g.longitude, g.latitude];
    let neighbors: Vec<&SensorNode> = tree.nearest_neighbor_iter(&query).take(k_eff).collect();
    let distances: Vec<f64> = neighbors.iter().map(|n| n.distance_2(&query).sqrt()).collect();

    let zero_distance: Vec<usize> = distances.iter().enumerate().filter(|(_, &d)| d == 0.0).map(|(i, _)| i).collect();

    let value = if !zero_distance.is_empty() {
        let sum: f64 = zero_distance.iter().map(|&i| active[*neighbors[i].data()].pm25).sum();
        sum / zero_distance.len() as f64
    } else {
        let mut weight_sum = 0.0;
        let mut value_sum = 0.0;
        for (i, n) in neighbors.iter().enumerate() {
            let w = distances[i].powf(-p);
            weight_sum += w;
            value_sum += w * active[*n.data()].pm25;
        }
        value_sum / weight_sum
    };

    let contributors = neighbors.iter().map(|n| active[*n.data()].sensor_id.clone()).collect();
    GridPrediction { grid_id: g.id, polygon_idx: g.polygon_idx, value, contributors }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensor(id: &str, lon: f64, lat: f64, pm25: f64) -> ActiveSensor {
        ActiveSensor { sensor_id: id.to_string(), longitude: lon, latitude: lat, pm25 }
    }

    #[test]
    fn toy_square_predicts_equally_weighted_mean_at_center() {
        let active = vec![
            sensor("a", 0.0, 0.0, 10.0),
            sensor("b", 0.01, 0.0, 20.0),
            sensor("c", 0.01, 0.01, 30.0),
            sensor("d", 0.0, 0.01, 40.0),
        ];
        let grid = vec![GridPoint { id: 0, longitude: 0.005, latitude: 0.005, polygon_idx: 0 }];
        let predictions = interpolate_timestamp(&active, &grid, 4, 2.0);
        assert_eq!(predictions.len(), 1);
        assert!((predictions[0].value - 25.0).abs() < 1e-9, "got {}", predictions[0].value);
    }

    #[test]
    fn exact_hit_returns_sensor_value() {
        let active = vec![sensor("a", 0.0, 0.0, 10.0), sensor("hit", 0.005, 0.005, 100.0), sensor("b", 0.01, 0.01, 30.0)];
        let grid = vec![GridPoint { id: 0, longitude: 0.005, latitude: 0.005, polygon_idx: 0 }];
        let predictions = interpolate_timestamp(&active, &grid, 3, 2.0);
        assert_eq!(predictions[0].value, 100.0);
    }

    #[test]
    fn prediction_stays_within_convex_hull_of_contributors() {
        let active = vec![sensor("a", 0.0, 0.0, 10.0), sensor("b", 0.02, 0.0, 50.0), sensor("c", 0.01, 0.02, 30.0)];
        let grid = vec![GridPoint { id: 0, longitude: 0.008, latitude: 0.006, polygon_idx: 0 }];
        let predictions = interpolate_timestamp(&active, &grid, 3, 2.0);
        let values: Vec<f64> = active.iter().map(|s| s.pm25).collect();
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert!(predictions[0].value >= min && predictions[0].value <= max);
    }

    #[test]
    fn k_is_capped_by_active_sensor_count() {
        let active = vec![sensor("a", 0.0, 0.0, 10.0)];
        let grid = vec![GridPoint { id: 0, longitude: 0.001, latitude: 0.001, polygon_idx: 0 }];
        let predictions = interpolate_timestamp(&active, &grid, 10, 2.0);
        assert_eq!(predictions[0].contributors, vec!["a".to_string()]);
    }

    #[test]
    fn averages_multiple_coincident_zero_distance_sensors() {
        let active = vec![sensor("a", 0.0, 0.0, 10.0), sensor("b", 0.0, 0.0, 30.0), sensor("c", 1.0, 1.0, 1000.0)];
        let grid = vec![GridPoint { id: 0, longitude: 0.0, latitude: 0.0, polygon_idx: 0 }];
        let predictions = interpolate_timestamp(&active, &grid, 3, 2.0);
        assert_eq!(predictions[0].value, 20.0);
    }
}
