//! Great-circle distance for provenance reporting (spec §4.9).
//!
//! Kept deliberately separate from the IDW engine's planar Euclidean
//! distance (spec §4.7) — the two are not interchangeable, they answer
//! different questions (neighbor selection vs. reported distance).

use haversine::{distance, Location, Units};

/// Great-circle distance between two `(longitude, latitude)` points, in km.
pub fn great_circle_km(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let a = Location { latitude: lat1, longitude: lon1 };
    let b = Location { latitude: lat2, longitude: lon2 };
    distance(a, b, Units::Kilometers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_identical_points() {
        assert!(great_circle_km(106.8, -6.2, 106.8, -6.2).abs() < 1e-9);
    }

    #[test]
    fn jakarta_scale_distance_is_reasonable() {
        // Roughly 1 degree of latitude near the equator is ~111 km.
        let km = great_circle_km(106.8, -6.2, 106.8, -5.2);
        assert!((100.0..120.0).contains(&km), "got {km}");
    }
}
