//! Reads the kelurahan polygon shapefile and resolves the display name for
//! each feature (spec §3, §6).

use geo::{BoundingRect, MultiPolygon};
use shapefile::dbase::FieldValue;
use shapefile::Shape;
use tracing::warn;

use crate::error::{PipelineError, Result};
use crate::models::Kelurahan;

/// Priority list of candidate name attributes (spec §3).
const NAME_FIELD_PRIORITY: &[&str] = &["KELURAHAN_NAME", "NAMOBJ", "NAMA", "DESA", "NAME", "KELURAHAN"];

fn resolve_name(record: &shapefile::dbase::Record, fallback_index: usize) -> (String, bool) {
    for field in NAME_FIELD_PRIORITY {
        if let Some(FieldValue::Character(Some(value))) = record.get(*field) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return (trimmed.to_string(), false);
            }
        }
    }
    // Fall back to the first string-valued attribute in the record.
    for (_, value) in record.iter() {
        if let FieldValue::Character(Some(value)) = value {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return (trimmed.to_string(), false);
            }
        }
    }
    (format!("Kelurahan {}", fallback_index + 1), true)
}

/// Reads every polygon feature from `path`, resolving its display name and
/// precomputing its bounding rectangle. Fatal if the file is unreadable or
/// contains no polygons; a missing name field is recoverable (spec §7).
pub fn read_kelurahan_polygons(path: &std::path::Path) -> Result<Vec<Kelurahan>> {
    let mut reader = shapefile::Reader::from_path(path)?;
    let mut kelurahan = Vec::new();
    let mut synthesized_any = false;

    for (index, result) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = result?;
        let multi_polygon: MultiPolygon<f64> = match shape {
            Shape::Polygon(polygon) => polygon.into(),
            other => {
                warn!(index, shape = ?other, "skipping non-polygon shapefile feature");
                continue;
            },
        };
        if multi_polygon.0.is_empty() {
            warn!(index, "skipping shapefile feature with no rings");
            continue;
        }
        // Keep every disjoint part (spec §3 treats a kelurahan as one polygon
        // identity even when the shapefile encodes it as several ring-groups,
        // e.g. a kelurahan split by a river); a single `Polygon` would silently
        // drop coverage over the discarded parts.
        let Some(bbox) = multi_polygon.bounding_rect() else {
            warn!(index, "skipping degenerate polygon with no bounding rectangle");
            continue;
        };
        let (name, synthesized) = resolve_name(&record, index);
        synthesized_any |= synthesized;
        kelurahan.push(Kelurahan { index, name, polygon: multi_polygon, bbox });
    }

    if kelurahan.is_empty() {
        return Err(PipelineError::Geometry(format!("shapefile {} has no polygons", path.display())));
    }
    if synthesized_any {
        warn!("one or more kelurahan features had no usable name attribute; synthesized sequential names");
    }
    Ok(kelurahan)
}
