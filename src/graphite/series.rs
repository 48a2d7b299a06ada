//! Render response wire model

use serde::{Deserialize, Serialize};

/// One sample in a series. Graphite serializes these as two-element arrays
/// `[value, epochSeconds]` where `value` is `null` during a reporting gap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(Option<f64>, i64)", into = "(Option<f64>, i64)")]
pub struct Datapoint {
    /// Sample value; `None` marks a gap, which is distinct from zero
    pub value: Option<f64>,
    /// Sample time in epoch seconds
    pub timestamp: i64,
}

impl Datapoint {
    pub fn new(value: Option<f64>, timestamp: i64) -> Self {
        Self { value, timestamp }
    }
}

impl From<(Option<f64>, i64)> for Datapoint {
    fn from((value, timestamp): (Option<f64>, i64)) -> Self {
        Self { value, timestamp }
    }
}

impl From<Datapoint> for (Option<f64>, i64) {
    fn from(dp: Datapoint) -> Self {
        (dp.value, dp.timestamp)
    }
}

/// One concrete named metric timeline, datapoints oldest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    /// Resolved series name
    pub target: String,
    pub datapoints: Vec<Datapoint>,
}

impl Series {
    /// Most recent non-missing sample, scanning newest to oldest.
    ///
    /// Metric pipelines report with variable lag, so the newest slot is
    /// often not yet populated; the freshest real measurement wins over
    /// defaulting to zero or interpolating. Returns `None` when every
    /// datapoint is missing.
    pub fn latest_value(&self) -> Option<f64> {
        self.datapoints.iter().rev().find_map(|dp| dp.value)
    }
}
