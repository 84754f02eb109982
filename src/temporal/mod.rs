//! Cadence classification, temporal normalization, selective imputation,
//! and the completeness filter (spec §4.2–§4.5).

mod cadence;
mod completeness;
mod impute;
mod normalize;

pub use cadence::{classify_all, elect_interval, CadenceSummary};
pub use completeness::{filter_complete, timestamp_from_epoch, ActiveSensorMap};
pub use impute::impute;
pub use normalize::{normalize, round_to_interval, NormalizeOutcome};
