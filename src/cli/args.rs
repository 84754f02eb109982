//! Raw CLI argument definitions (spec §6.1), parsed by `clap` and then
//! validated into a [`crate::config::RunConfig`].

use clap::Parser;
use std::path::PathBuf;

use crate::config::IntervalTiePolicy;
use crate::error::{PipelineError, Result};

/// Estimate PM2.5 concentrations for every Jakarta kelurahan on a regular
/// time grid via spatio-temporal IDW interpolation of sensor readings.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Prepared measurement table (CSV): sensor_id, longitude, latitude, datetime, pm25.
    #[arg(long)]
    pub input: PathBuf,

    /// Kelurahan polygon shapefile (WGS84).
    #[arg(long)]
    pub shapefile: PathBuf,

    /// Directory the primary and distance-metrics output files are written to.
    #[arg(long, value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Optional station table (CSV: sensor_id, longitude, latitude) that, if
    /// given, is authoritative for sensor location.
    #[arg(long)]
    pub stations: Option<PathBuf>,

    /// Minimum active-sensor count required to accept a timestamp.
    #[arg(long, default_value_t = 50)]
    pub s_min: u32,

    /// IDW neighbor cap. Always echoed into the output filename.
    #[arg(long, default_value_t = 10)]
    pub k: usize,

    /// IDW power.
    #[arg(long, default_value_t = 2.0)]
    pub p: f64,

    /// Grid spacing in degrees.
    #[arg(long, default_value_t = 0.005)]
    pub cell_size_deg: f64,

    /// "lon_min,lon_max,lat_min,lat_max".
    #[arg(long, default_value = "106.0,107.0,-7.0,-5.4")]
    pub bbox: String,

    /// Upper rejection threshold for pm25 readings (exclusive).
    #[arg(long, default_value_t = 500.0)]
    pub pm25_cap: f64,

    /// How to break ties when electing the global sampling interval.
    #[arg(long, value_enum, default_value_t = IntervalTiePolicyArg::PreferHourly)]
    pub interval_tie_policy: IntervalTiePolicyArg,

    /// Worker count for the parallel scheduler. Defaults to hardware threads - 1.
    #[arg(long)]
    pub workers: Option<usize>,

    /// Per-timestamp soft task budget, in seconds.
    #[arg(long, default_value_t = 60)]
    pub task_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum IntervalTiePolicyArg {
    PreferHourly,
    #[value(name = "prefer-30min")]
    PreferThirty,
}

impl From<IntervalTiePolicyArg> for IntervalTiePolicy {
    fn from(v: IntervalTiePolicyArg) -> Self {
        match v {
            IntervalTiePolicyArg::PreferHourly => IntervalTiePolicy::PreferHourly,
            IntervalTiePolicyArg::PreferThirty => IntervalTiePolicy::PreferThirty,
        }
    }
}

impl Args {
    pub fn into_config(self) -> Result<crate::config::RunConfig> {
        if !self.input.exists() {
            return Err(PipelineError::Config(format!("input file not found: {}", self.input.display())));
        }
        if !self.shapefile.exists() {
            return Err(PipelineError::Config(format!("shapefile not found: {}", self.shapefile.display())));
        }
        crate::config::RunConfig::validate(
            self.input,
            self.shapefile,
            self.stations,
            self.output_dir,
            self.s_min,
            self.k,
            self.p,
            self.cell_size_deg,
            &self.bbox,
            self.pm25_cap,
            self.interval_tie_policy.into(),
            self.workers,
            self.task_timeout_secs,
        )
    }
}
