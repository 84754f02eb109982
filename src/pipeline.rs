//! Top-level orchestration: wires the loader, temporal stages, spatial
//! precompute, and parallel scheduler into a single run, and accumulates
//! the [`RunSummary`] the CLI reports (spec §2, §7, §11).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use tracing::info;

use crate::config::RunConfig;
use crate::error::Result;
use crate::io;
use crate::models::{Interval, TimestampType};
use crate::representative::select_representative;
use crate::schedule::{run_timestamps, ScheduleOutcome, SpatialAssets, TaskFailure, TimestampTask};
use crate::spatial::build_grid;
use crate::temporal::{classify_all, elect_interval, filter_complete, impute, normalize, timestamp_from_epoch};

/// Every recoverable condition and headline statistic from one run, surfaced
/// to the console (spec §7: "recoverable errors are surfaced in the final
/// summary with counts") and used to decide the exit code.
pub struct RunSummary {
    pub total_rows_read: usize,
    pub excluded_rows: usize,
    pub excluded_sensors: usize,
    pub elected_interval: Interval,
    pub imputed_count: usize,
    pub timestamps_total: usize,
    pub timestamps_accepted: usize,
    pub timestamps_dropped_insufficient: usize,
    pub task_failures: Vec<TaskFailure>,
    pub kelurahan_without_grid_points: Vec<String>,
    /// The three representative timestamps (spec §4.9, I5), with their
    /// Jakarta wall-clock time for the run summary.
    pub representative_timestamps: Vec<(TimestampType, DateTime<FixedOffset>)>,
    pub primary_output_path: PathBuf,
    pub distance_output_path: PathBuf,
}

impl RunSummary {
    /// A run is a full success only when every accepted timestamp both
    /// cleared the completeness filter and produced a task result (spec §6's
    /// exit code 0 vs. 1 contract).
    pub fn is_full_success(&self) -> bool {
        self.timestamps_dropped_insufficient == 0 && self.task_failures.is_empty()
    }
}

/// Runs the whole pipeline for one validated configuration and writes both
/// output tables. Returns the run summary on success (fatal conditions are
/// `Err`, per spec §7's taxonomy).
pub fn run(config: &RunConfig) -> Result<RunSummary> {
    let load_outcome = io::load(config)?;
    info!(sensors = load_outcome.sensors.len(), measurements = load_outcome.measurements.len(), "loaded input");

    let kelurahan = io::read_kelurahan_polygons(&config.shapefile_path)?;
    info!(kelurahan = kelurahan.len(), "loaded kelurahan polygons");

    let (labels, cadence_summary) = classify_all(&load_outcome.measurements);
    let interval = elect_interval(&cadence_summary, config.interval_tie_policy);
    info!(
        thirty = cadence_summary.thirty,
        hourly = cadence_summary.hourly,
        mixed = cadence_summary.mixed,
        other = cadence_summary.other,
        interval_minutes = interval.minutes(),
        "elected global sampling interval"
    );

    let normalized = normalize(&load_outcome.measurements, interval);
    let imputed = impute(&normalized.measurements, &normalized.axis, &labels, interval);
    let imputed_count = imputed.len();

    let mut all_measurements = normalized.measurements;
    all_measurements.extend(imputed);

    let (accepted, timestamps_dropped_insufficient) = filter_complete(&all_measurements, config.s_min);
    let timestamps_total = normalized.axis.len();
    let timestamps_accepted = accepted.len();
    info!(timestamps_total, timestamps_accepted, timestamps_dropped_insufficient, "completeness filter applied");

    let spatial_index = build_grid(&kelurahan, config.cell_size_deg);
    let kelurahan_without_grid_points: Vec<String> = kelurahan
        .iter()
        .enumerate()
        .filter(|(index, _)| !spatial_index.grid_by_polygon.contains_key(index))
        .map(|(_, k)| k.name.clone())
        .collect();

    let sensor_positions: HashMap<String, (f64, f64)> =
        load_outcome.sensors.iter().map(|s| (s.sensor_id.clone(), (s.longitude, s.latitude))).collect();

    let counts: Vec<(i64, usize)> = accepted.iter().map(|(&ts, readings)| (ts, readings.len())).collect();
    let representative_by_type = select_representative(&counts);
    let tz = FixedOffset::east_opt(7 * 3600).expect("fixed +07:00 offset is always valid");
    let representative_timestamps: Vec<(TimestampType, DateTime<FixedOffset>)> = representative_by_type
        .iter()
        .map(|(&ty, &epoch_secs)| (ty, timestamp_from_epoch(epoch_secs, tz)))
        .collect();
    let representative_by_epoch: HashMap<i64, TimestampType> =
        representative_by_type.into_iter().map(|(ty, ts)| (ts, ty)).collect();

    let tasks: Vec<TimestampTask> = accepted
        .into_iter()
        .map(|(epoch_secs, readings)| TimestampTask {
            epoch_secs,
            timestamp_ms: io::encode_stata_tc(epoch_secs),
            readings,
        })
        .collect();

    let assets = Arc::new(SpatialAssets {
        grid_points: spatial_index.grid_points,
        grid_by_polygon: spatial_index.grid_by_polygon,
        kelurahan,
        sensor_positions,
    });

    let ScheduleOutcome { primary_rows, distance_rows, failures } =
        run_timestamps(&tasks, &representative_by_epoch, &assets, config);

    let (date_from, date_to) = io::extract_date_range(&config.input_path);
    let primary_filename = io::primary_output_filename(config.k, &date_from, &date_to);
    let distance_filename = io::distance_output_filename(&date_from, &date_to);
    let primary_output_path = io::write_primary_output(&config.output_dir, &primary_filename, &primary_rows)?;
    let distance_output_path = io::write_distance_output(&config.output_dir, &distance_filename, &distance_rows)?;

    Ok(RunSummary {
        total_rows_read: load_outcome.total_rows_read,
        excluded_rows: load_outcome.excluded_rows,
        excluded_sensors: load_outcome.excluded_sensors,
        elected_interval: interval,
        imputed_count,
        timestamps_total,
        timestamps_accepted,
        timestamps_dropped_insufficient,
        task_failures: failures,
        kelurahan_without_grid_points,
        representative_timestamps,
        primary_output_path,
        distance_output_path,
    })
}
