//! The validated, immutable run configuration.
//!
//! Replaces the "global mutable paths and logging sinks" pattern flagged in
//! the design notes with a single config object constructed once from CLI
//! `Args` and passed read-only through every pipeline stage.

use crate::error::{PipelineError, Result};

/// Geographic bounding box used both to validate sensors and as the grid
/// builder's fallback extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl BoundingBox {
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.lon_min && lon <= self.lon_max && lat >= self.lat_min && lat <= self.lat_max
    }

    /// Parses `"lon_min,lon_max,lat_min,lat_max"`.
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 4 {
            return Err(PipelineError::Config(format!(
                "bbox must be \"lon_min,lon_max,lat_min,lat_max\", got {s:?}"
            )));
        }
        let nums: Result<Vec<f64>> = parts
            .iter()
            .map(|p| {
                p.trim()
                    .parse::<f64>()
                    .map_err(|e| PipelineError::Config(format!("invalid bbox component {p:?}: {e}")))
            })
            .collect();
        let nums = nums?;
        let bbox = BoundingBox { lon_min: nums[0], lon_max: nums[1], lat_min: nums[2], lat_max: nums[3] };
        if bbox.lon_min >= bbox.lon_max || bbox.lat_min >= bbox.lat_max {
            return Err(PipelineError::Config(format!("bbox bounds are degenerate: {s:?}")));
        }
        Ok(bbox)
    }
}

/// Tie-breaking policy for the elected global interval (spec §4.2, §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalTiePolicy {
    PreferHourly,
    PreferThirty,
}

/// The fully validated, read-only configuration for one run of the engine.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input_path: std::path::PathBuf,
    pub shapefile_path: std::path::PathBuf,
    pub stations_path: Option<std::path::PathBuf>,
    pub output_dir: std::path::PathBuf,
    pub s_min: u32,
    pub k: usize,
    pub p: f64,
    pub cell_size_deg: f64,
    pub bbox: BoundingBox,
    pub pm25_cap: f64,
    pub interval_tie_policy: IntervalTiePolicy,
    pub workers: usize,
    pub task_timeout_secs: u64,
}

impl RunConfig {
    /// Validates raw CLI input into a `RunConfig`. Fatal per spec §7: a
    /// `ConfigError` here aborts before any I/O happens.
    #[allow(clippy::too_many_arguments)]
    pub fn validate(
        input_path: std::path::PathBuf,
        shapefile_path: std::path::PathBuf,
        stations_path: Option<std::path::PathBuf>,
        output_dir: std::path::PathBuf,
        s_min: u32,
        k: usize,
        p: f64,
        cell_size_deg: f64,
        bbox_str: &str,
        pm25_cap: f64,
        interval_tie_policy: IntervalTiePolicy,
        workers: Option<usize>,
        task_timeout_secs: u64,
    ) -> Result<Self> {
        if s_min == 0 {
            return Err(PipelineError::Config("s-min must be >= 1".into()));
        }
        if k == 0 {
            return Err(PipelineError::Config("k must be >= 1".into()));
        }
        if !(p > 0.0 && p.is_finite()) {
            return Err(PipelineError::Config("p must be a finite positive number".into()));
        }
        if !(cell_size_deg > 0.0 && cell_size_deg.is_finite()) {
            return Err(PipelineError::Config("cell-size-deg must be a finite positive number".into()));
        }
        if !(pm25_cap > 0.0 && pm25_cap.is_finite()) {
            return Err(PipelineError::Config("pm25-cap must be a finite positive number".into()));
        }
        if task_timeout_secs == 0 {
            return Err(PipelineError::Config("task-timeout-secs must be >= 1".into()));
        }
        let bbox = BoundingBox::parse(bbox_str)?;
        let workers = workers
            .unwrap_or_else(|| num_cpus::get().saturating_sub(1).max(1))
            .max(1);

        Ok(RunConfig {
            input_path,
            shapefile_path,
            stations_path,
            output_dir,
            s_min,
            k,
            p,
            cell_size_deg,
            bbox,
            pm25_cap,
            interval_tie_policy,
            workers,
            task_timeout_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_bbox() {
        let b = BoundingBox::parse("106.0,107.0,-7.0,-5.4").unwrap();
        assert_eq!(b, BoundingBox { lon_min: 106.0, lon_max: 107.0, lat_min: -7.0, lat_max: -5.4 });
    }

    #[test]
    fn rejects_malformed_bbox() {
        assert!(BoundingBox::parse("106.0,107.0,-7.0").is_err());
        assert!(BoundingBox::parse("107.0,106.0,-7.0,-5.4").is_err());
    }

    #[test]
    fn rejects_zero_s_min() {
        let err = RunConfig::validate(
            "in.csv".into(),
            "shp.shp".into(),
            None,
            "out".into(),
            0,
            10,
            2.0,
            0.005,
            "106.0,107.0,-7.0,-5.4",
            500.0,
            IntervalTiePolicy::PreferHourly,
            None,
            60,
        );
        assert!(err.is_err());
    }

    #[test]
    fn defaults_workers_to_hw_threads_minus_one() {
        let cfg = RunConfig::validate(
            "in.csv".into(),
            "shp.shp".into(),
            None,
            "out".into(),
            50,
            10,
            2.0,
            0.005,
            "106.0,107.0,-7.0,-5.4",
            500.0,
            IntervalTiePolicy::PreferHourly,
            None,
            60,
        )
        .unwrap();
        assert!(cfg.workers >= 1);
    }
}
