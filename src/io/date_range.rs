//! Extracts the `{YYYY-MM-DD}_to_{YYYY-MM-DD}` substring that the external
//! preparation stage encodes into its output filename (spec §6), so this
//! engine's own output filenames can carry the same date range.

use regex::Regex;
use std::sync::OnceLock;

static DATE_RANGE_RE: OnceLock<Regex> = OnceLock::new();

fn date_range_regex() -> &'static Regex {
    DATE_RANGE_RE.get_or_init(|| Regex::new(r"(\d{4}-\d{2}-\d{2})_to_(\d{4}-\d{2}-\d{2})").expect("valid regex"))
}

/// Returns `(from, to)` date strings parsed out of a filename like
/// `master_2024-01-01_to_2024-01-31.csv`. Falls back to `"unknown"` on
/// both ends when the input filename carries no recognizable date range —
/// this is not fatal, just loses filename fidelity for downstream output.
pub fn extract_date_range(path: &std::path::Path) -> (String, String) {
    let stem = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    match date_range_regex().captures(stem) {
        Some(caps) => (caps[1].to_string(), caps[2].to_string()),
        None => ("unknown".to_string(), "unknown".to_string()),
    }
}
