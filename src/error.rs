//! Defines the pipeline's primary error type `PipelineError` and a convenience `Result` alias.
//!
//! Uses the `thiserror` crate for ergonomic error definition and provides `From`
//! implementations to convert common external errors into `PipelineError` variants.
//! Errors that do not implement `Clone` are wrapped in `Arc` so `PipelineError` stays cloneable,
//! which lets it be recorded in the run summary as well as propagated with `?`.

use std::sync::Arc;
use thiserror::Error;

/// The fatal error kinds of the pipeline (spec §7). Per-timestamp task
/// failures and dropped-timestamp warnings are *not* represented here —
/// they are recoverable and tracked in [`crate::pipeline::RunSummary`]
/// instead of aborting the run.
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    /// Missing/invalid parameter; fatal before any work starts.
    #[error("configuration error: {0}")]
    Config(String),

    /// Missing required columns, unparseable datetimes, or zero-length input.
    #[error("input shape error: {0}")]
    InputShape(String),

    /// Shapefile unreadable or has no polygons.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// I/O failure, including exhaustion of the write-retry-to-temp-dir policy.
    #[error("I/O error: {0}")]
    Io(Arc<std::io::Error>),

    /// CSV parse/serialize failure.
    #[error("CSV error: {0}")]
    Csv(Arc<csv::Error>),

    /// Shapefile parse failure.
    #[error("shapefile error: {0}")]
    Shapefile(Arc<shapefile::Error>),
}

/// A specialized `Result` type using the pipeline's `PipelineError`.
pub type Result<T> = std::result::Result<T, PipelineError>;

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Io(Arc::new(err))
    }
}

impl From<csv::Error> for PipelineError {
    fn from(err: csv::Error) -> Self {
        PipelineError::Csv(Arc::new(err))
    }
}

impl From<shapefile::Error> for PipelineError {
    fn from(err: shapefile::Error) -> Self {
        PipelineError::Shapefile(Arc::new(err))
    }
}

/// Maps the run's terminal state to the process exit code contract (spec §6):
/// 0 full success, 1 partial success (some timestamps failed/dropped but
/// output was written), 2 configuration/input/geometry error, 3 unrecoverable
/// error (including write-retry exhaustion).
pub fn exit_code_for(outcome: &std::result::Result<bool, PipelineError>) -> i32 {
    match outcome {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(PipelineError::Config(_) | PipelineError::InputShape(_) | PipelineError::Geometry(_)) => 2,
        Err(PipelineError::Io(_) | PipelineError::Csv(_) | PipelineError::Shapefile(_)) => 3,
    }
}
