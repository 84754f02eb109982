//! External I/O: reading the measurement/station tables and the kelurahan
//! shapefile, writing the output tables, and the isolated Stata `%tc`
//! epoch codec.

mod date_range;
mod loader;
mod shapefile_reader;
mod stata;
mod writer;

pub use date_range::extract_date_range;
pub use loader::{load, LoadOutcome};
pub use shapefile_reader::read_kelurahan_polygons;
pub use stata::encode_stata_tc;
pub use writer::{distance_output_filename, primary_output_filename, write_distance_output, write_primary_output};
