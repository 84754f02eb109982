//! Fixed interpolation grid points (spec §3, §4.6).

/// A single point of the fixed lon/lat lattice, clipped to the kelurahan
/// union and assigned to exactly one kelurahan polygon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    /// Implicit id, assigned by row order during grid construction.
    pub id: usize,
    pub longitude: f64,
    pub latitude: f64,
    /// Index into the kelurahan polygon table this point belongs to.
    pub polygon_idx: usize,
}
