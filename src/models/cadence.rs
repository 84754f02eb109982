//! Cadence labels and the elected global interval (spec §3, §4.2).

/// Per-sensor cadence classification, derived from the fraction of valid
/// half-hour-slot readings over the full time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CadenceLabel {
    /// f > 0.7: sensor reports natively on the half hour.
    Thirty,
    /// f < 0.3: sensor reports natively on the hour.
    Hourly,
    /// 0.3 <= f <= 0.7: ambiguous cadence.
    Mixed,
    /// Insufficient data to classify (zero half-hour slots observed).
    Other,
}

impl CadenceLabel {
    /// Classifies a sensor from `f = valid_half_hour_readings / half_hour_slots`.
    pub fn from_fraction(f: f64) -> Self {
        if f > 0.7 {
            CadenceLabel::Thirty
        } else if f < 0.3 {
            CadenceLabel::Hourly
        } else {
            CadenceLabel::Mixed
        }
    }
}

/// The single sampling period elected for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Thirty,
    Sixty,
}

impl Interval {
    pub fn minutes(self) -> i64 {
        match self {
            Interval::Thirty => 30,
            Interval::Sixty => 60,
        }
    }
}
