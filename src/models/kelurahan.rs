//! Kelurahan (urban sub-district) polygon identity (spec §3).

use geo::{MultiPolygon, Rect};

/// A single kelurahan feature, with its resolved display name and
/// precomputed bounding rectangle (used for the spatial-index prefilter in
/// the grid builder).
///
/// `polygon` is a `MultiPolygon` rather than a single `Polygon`: a shapefile
/// `Shape::Polygon` feature can carry multiple disjoint ring-groups for one
/// administrative unit (e.g. a kelurahan split by a river or canal), and
/// every part must stay reachable by `Contains`/`BoundingRect` or grid
/// coverage silently drops over the discarded parts.
#[derive(Debug, Clone)]
pub struct Kelurahan {
    /// Index into the shapefile's feature order; used to break ties when a
    /// grid point falls on a shared boundary between polygons.
    pub index: usize,
    pub name: String,
    pub polygon: MultiPolygon<f64>,
    pub bbox: Rect<f64>,
}
