//! Parallel Scheduler (spec §4.10, §5).

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::warn;

use crate::aggregate::aggregate_polygons;
use crate::config::RunConfig;
use crate::idw::{interpolate_timestamp, ActiveSensor};
use crate::models::{DistanceResult, GridPoint, Kelurahan, KelurahanResult, TimestampType};
use crate::representative::build_distance_rows;

/// A per-timestamp worker error; the timestamp is skipped, never retried
/// (spec §4.10).
#[derive(Debug, Clone)]
pub struct TaskFailure {
    pub timestamp_ms: i64,
    pub reason: String,
}

pub struct ScheduleOutcome {
    pub primary_rows: Vec<KelurahanResult>,
    pub distance_rows: Vec<DistanceResult>,
    pub failures: Vec<TaskFailure>,
}

/// One accepted timestamp's active readings (spec §5's "workers should not
/// load [the full table] — only the rows for the timestamps they own").
pub struct TimestampTask {
    pub epoch_secs: i64,
    pub timestamp_ms: i64,
    pub readings: Vec<(String, f64)>,
}

/// The read-only assets every task shares (spec §5): grid points, the
/// grid-to-polygon map, the kelurahan name table, and the sensor-coordinate
/// index. Wrapped in `Arc` so handing it to a task is a refcount bump, not
/// a deep copy, and no `Mutex` is needed since nothing mutates it.
pub struct SpatialAssets {
    pub grid_points: Vec<GridPoint>,
    pub grid_by_polygon: HashMap<usize, Vec<usize>>,
    pub kelurahan: Vec<Kelurahan>,
    pub sensor_positions: HashMap<String, (f64, f64)>,
}

/// Runs every accepted timestamp's IDW + aggregation (and distance
/// reporting for the three representative timestamps) in parallel,
/// isolating per-task panics and soft timeouts into [`TaskFailure`] rows
/// instead of aborting the run.
pub fn run_timestamps(
    tasks: &[TimestampTask],
    representative: &HashMap<i64, TimestampType>,
    assets: &Arc<SpatialAssets>,
    config: &RunConfig,
) -> ScheduleOutcome {
    let pool =
        rayon::ThreadPoolBuilder::new().num_threads(config.workers).build().expect("thread pool with validated worker count");
    let timeout = Duration::from_secs(config.task_timeout_secs);

    let progress = ProgressBar::new(tasks.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} timestamps")
            .expect("valid progress bar template")
            .progress_chars("#>-"),
    );

    let results: Vec<Result<(Vec<KelurahanResult>, Vec<DistanceResult>), String>> = pool.install(|| {
        tasks
            .par_iter()
            .map(|task| {
                let assets = Arc::clone(assets);
                let k = config.k;
                let p = config.p;
                let timestamp_ms = task.timestamp_ms;
                let readings = task.readings.clone();
                let representative_type = representative.get(&task.epoch_secs).copied();
                let progress = progress.clone();

                let outcome = run_with_timeout(timeout, move || {
                    let active: Vec<ActiveSensor> = readings
                        .iter()
                        .filter_map(|(sensor_id, pm25)| {
                            assets.sensor_positions.get(sensor_id).map(|&(longitude, latitude)| ActiveSensor {
                                sensor_id: sensor_id.clone(),
                                longitude,
                                latitude,
                                pm25: *pm25,
                            })
                        })
                        .collect();
                    let active_count = active.len();

                    let predictions = interpolate_timestamp(&active, &assets.grid_points, k, p);
                    let primary =
                        aggregate_polygons(&predictions, &assets.grid_by_polygon, &assets.kelurahan, active_count, timestamp_ms);
                    let distances = match representative_type {
                        Some(ty) => build_distance_rows(
                            ty,
                            timestamp_ms,
                            &predictions,
                            &assets.grid_by_polygon,
                            &assets.grid_points,
                            &assets.kelurahan,
                            &assets.sensor_positions,
                            active_count,
                        ),
                        None => Vec::new(),
                    };
                    (primary, distances)
                });
                progress.inc(1);
                outcome
            })
            .collect()
    });
    progress.finish_and_clear();

    let mut primary_rows = Vec::new();
    let mut distance_rows = Vec::new();
    let mut failures = Vec::new();

    for (task, outcome) in tasks.iter().zip(results) {
        match outcome {
            Ok((primary, distance)) => {
                primary_rows.extend(primary);
                distance_rows.extend(distance);
            },
            Err(reason) => {
                warn!(timestamp_ms = task.timestamp_ms, reason = %reason, "task failed, timestamp skipped");
                failures.push(TaskFailure { timestamp_ms: task.timestamp_ms, reason });
            },
        }
    }

    // Deterministic ordering restored after the unordered parallel fan-out (spec §4.10, P9).
    primary_rows.sort_by(|a, b| a.timestamp_ms.cmp(&b.timestamp_ms).then_with(|| a.kelurahan_name.cmp(&b.kelurahan_name)));
    distance_rows.sort_by(|a, b| a.timestamp_ms.cmp(&b.timestamp_ms).then_with(|| a.kelurahan_name.cmp(&b.kelurahan_name)));

    ScheduleOutcome { primary_rows, distance_rows, failures }
}

/// Runs `compute` on a scoped OS thread and joins with a deadline. A task
/// that blows its budget is abandoned (not joined) and reported as a
/// `"timeout"` failure; a caught panic is reported as `"panic"`.
fn run_with_timeout<F>(timeout: Duration, compute: F) -> Result<(Vec<KelurahanResult>, Vec<DistanceResult>), String>
where
    F: FnOnce() -> (Vec<KelurahanResult>, Vec<DistanceResult>) + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let result = std::panic::catch_unwind(AssertUnwindSafe(compute));
        let _ = tx.send(result);
    });

    match rx.recv_timeout(timeout) {
        Ok(Ok(rows)) => Ok(rows),
        Ok(Err(_)) => Err("panic".to_string()),
        Err(_) => Err("timeout".to_string()),
    }
}
