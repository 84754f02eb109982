//! Grid construction, polygon assignment, and distance helpers (spec §4.6,
//! §4.9). Named apart from the `geo` crate it builds on to avoid a
//! module/crate name collision in `use` paths.

mod distance;
mod grid;

pub use distance::great_circle_km;
pub use grid::{build_grid, SpatialIndex};
