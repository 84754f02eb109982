//! Sensor identity and position.

use crate::config::BoundingBox;

/// A single PM2.5 monitoring station.
///
/// Positions are immutable for the run (spec: "a sensor with multiple
/// conflicting coordinates is kept with the first non-null encountered").
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    pub sensor_id: String,
    pub longitude: f64,
    pub latitude: f64,
}

impl Sensor {
    /// A sensor is valid iff both coordinates are finite and inside the
    /// configured bounding box.
    pub fn is_valid(&self, bbox: &BoundingBox) -> bool {
        self.longitude.is_finite() && self.latitude.is_finite() && bbox.contains(self.longitude, self.latitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox() -> BoundingBox {
        BoundingBox { lon_min: 106.0, lon_max: 107.0, lat_min: -7.0, lat_max: -5.4 }
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        let s = Sensor { sensor_id: "A".into(), longitude: f64::NAN, latitude: -6.2 };
        assert!(!s.is_valid(&bbox()));
    }

    #[test]
    fn rejects_outside_bbox() {
        let s = Sensor { sensor_id: "A".into(), longitude: 108.0, latitude: -6.2 };
        assert!(!s.is_valid(&bbox()));
    }

    #[test]
    fn accepts_inside_bbox() {
        let s = Sensor { sensor_id: "A".into(), longitude: 106.8, latitude: -6.2 };
        assert!(s.is_valid(&bbox()));
    }

    #[test]
    fn accepts_bbox_boundary() {
        let s = Sensor { sensor_id: "A".into(), longitude: 106.0, latitude: -5.4 };
        assert!(s.is_valid(&bbox()));
    }
}
