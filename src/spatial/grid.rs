//! Grid Builder and Spatial Precompute (spec §4.6).

use std::collections::HashMap;

use geo::{BoundingRect, Contains, Point, Rect};
use rstar::{RTree, RTreeObject, AABB};
use tracing::warn;

use crate::models::{GridPoint, Kelurahan};

/// The immutable spatial assets every scheduler task shares read-only
/// (spec §5's "read-only snapshots"): the lattice points retained inside
/// some polygon, and the grid-to-polygon grouping precomputed once.
pub struct SpatialIndex {
    pub grid_points: Vec<GridPoint>,
    pub grid_by_polygon: HashMap<usize, Vec<usize>>,
}

struct PolygonEnvelope {
    index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for PolygonEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

fn aabb_from_rect(rect: Rect<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y])
}

/// Builds the lon/lat lattice over the polygon union's bounding rectangle at
/// `cell_size_deg` spacing, retains only points inside a polygon, and groups
/// retained points by polygon index. Polygon bounding boxes are indexed with
/// an R-tree so each lattice point only runs the exact containment test
/// against overlap candidates, not the full polygon set.
pub fn build_grid(kelurahan: &[Kelurahan], cell_size_deg: f64) -> SpatialIndex {
    let envelopes: Vec<PolygonEnvelope> =
        kelurahan.iter().enumerate().map(|(index, k)| PolygonEnvelope { index, envelope: aabb_from_rect(k.bbox) }).collect();
    let tree = RTree::bulk_load(envelopes);

    let Some(union_bbox) = union_bounding_rect(kelurahan) else {
        return SpatialIndex { grid_points: Vec::new(), grid_by_polygon: HashMap::new() };
    };

    let mut grid_points = Vec::new();
    let mut grid_by_polygon: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut next_id = 0usize;

    let mut lat = union_bbox.min().y;
    while lat <= union_bbox.max().y {
        let mut lon = union_bbox.min().x;
        while lon <= union_bbox.max().x {
            if let Some(polygon_idx) = locate_polygon(&tree, kelurahan, lon, lat) {
                let id = next_id;
                next_id += 1;
                grid_points.push(GridPoint { id, longitude: lon, latitude: lat, polygon_idx });
                grid_by_polygon.entry(polygon_idx).or_default().push(id);
            }
            lon += cell_size_deg;
        }
        lat += cell_size_deg;
    }

    for (index, k) in kelurahan.iter().enumerate() {
        if !grid_by_polygon.contains_key(&index) {
            warn!(kelurahan = %k.name, "polygon contains no grid points at this cell size");
        }
    }

    SpatialIndex { grid_points, grid_by_polygon }
}

/// Finds the polygon containing `(lon, lat)`, preferring the lowest
/// shapefile index among overlapping-bbox candidates on a boundary tie
/// (spec §9's open-question resolution).
fn locate_polygon(tree: &RTree<PolygonEnvelope>, kelurahan: &[Kelurahan], lon: f64, lat: f64) -> Option<usize> {
    let mut candidates: Vec<usize> = tree.locate_all_at_point(&[lon, lat]).map(|e| e.index).collect();
    candidates.sort_unstable();
    let point = Point::new(lon, lat);
    candidates.into_iter().find(|&idx| kelurahan[idx].polygon.contains(&point))
}

fn union_bounding_rect(kelurahan: &[Kelurahan]) -> Option<Rect<f64>> {
    kelurahan.iter().filter_map(|k| k.polygon.bounding_rect()).fold(None, |acc, rect| match acc {
        None => Some(rect),
        Some(acc) => Some(Rect::new(
            geo::coord! { x: acc.min().x.min(rect.min().x), y: acc.min().y.min(rect.min().y) },
            geo::coord! { x: acc.max().x.max(rect.max().x), y: acc.max().y.max(rect.max().y) },
        )),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon, Polygon};

    fn square_kelurahan(index: usize, name: &str) -> Kelurahan {
        let polygon: Polygon<f64> = polygon![
            (x: 0.0, y: 0.0),
            (x: 0.01, y: 0.0),
            (x: 0.01, y: 0.01),
            (x: 0.0, y: 0.01),
            (x: 0.0, y: 0.0),
        ];
        let multi_polygon = MultiPolygon::new(vec![polygon]);
        let bbox = multi_polygon.bounding_rect().unwrap();
        Kelurahan { index, name: name.to_string(), polygon: multi_polygon, bbox }
    }

    #[test]
    fn retains_only_points_inside_the_polygon() {
        let kelurahan = vec![square_kelurahan(0, "Square")];
        let grid = build_grid(&kelurahan, 0.005);
        assert!(!grid.grid_points.is_empty());
        assert!(grid.grid_points.iter().all(|g| g.polygon_idx == 0));
        assert!(grid.grid_points.iter().all(|g| (0.0..=0.01).contains(&g.longitude) && (0.0..=0.01).contains(&g.latitude)));
    }

    #[test]
    fn groups_grid_points_by_polygon() {
        let kelurahan = vec![square_kelurahan(0, "Square")];
        let grid = build_grid(&kelurahan, 0.005);
        assert_eq!(grid.grid_by_polygon[&0].len(), grid.grid_points.len());
    }

    #[test]
    fn empty_polygon_set_yields_empty_grid() {
        let grid = build_grid(&[], 0.005);
        assert!(grid.grid_points.is_empty());
    }

    #[test]
    fn retains_grid_points_across_every_disjoint_part_of_a_multi_polygon_kelurahan() {
        let near: Polygon<f64> = polygon![
            (x: 0.0, y: 0.0), (x: 0.01, y: 0.0), (x: 0.01, y: 0.01), (x: 0.0, y: 0.01), (x: 0.0, y: 0.0),
        ];
        let far: Polygon<f64> = polygon![
            (x: 1.0, y: 1.0), (x: 1.01, y: 1.0), (x: 1.01, y: 1.01), (x: 1.0, y: 1.01), (x: 1.0, y: 1.0),
        ];
        let multi_polygon = MultiPolygon::new(vec![near, far]);
        let bbox = multi_polygon.bounding_rect().unwrap();
        let kelurahan = vec![Kelurahan { index: 0, name: "Split".to_string(), polygon: multi_polygon, bbox }];

        let grid = build_grid(&kelurahan, 0.005);
        let has_near = grid.grid_points.iter().any(|g| g.longitude < 0.02);
        let has_far = grid.grid_points.iter().any(|g| g.longitude > 0.99);
        assert!(has_near && has_far, "expected grid points in both disjoint parts");
    }
}
