//! Check evaluation engine

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::model::{Alert, AlertType, Check};
use crate::graphite::{GraphiteClient, GraphiteError, Series};

/// Evaluates checks against the metric backend.
///
/// One evaluation per check per scheduling tick; independent evaluations
/// share nothing but the client's connection pool and may run concurrently.
pub struct CheckEvaluator {
    graphite: Arc<GraphiteClient>,
}

impl CheckEvaluator {
    /// Create a new evaluator
    pub fn new(graphite: Arc<GraphiteClient>) -> Self {
        Self { graphite }
    }

    /// Evaluate one check, returning one alert per resolved series.
    ///
    /// Fail-fast and all-or-nothing: a fetch failure, or a series with no
    /// valid datapoint, aborts the whole evaluation with no alerts. A caller
    /// must not act on an incomplete picture of a check that covers multiple
    /// series. Retry is the caller's next tick.
    pub async fn evaluate(&self, check: &Check) -> Result<Vec<Alert>, CheckError> {
        let series = self.graphite.fetch(&check.target).await?;

        // from_type is read once here; every alert in the batch shares it
        let from_type = check.state;
        let now = Utc::now();

        let mut alerts = Vec::with_capacity(series.len());
        for s in &series {
            let value = latest_value(s)?;
            let to_type = evaluate_threshold(value, check);
            alerts.push(build_alert(check, &s.target, value, from_type, to_type, now)?);
        }

        Ok(alerts)
    }
}

/// Most recent non-missing sample of a series
fn latest_value(series: &Series) -> Result<f64, CheckError> {
    series
        .latest_value()
        .ok_or_else(|| CheckError::NoValidDatapoint {
            target: series.target.clone(),
        })
}

/// Compute the alert state for a value. Error takes priority over warn;
/// a value beyond neither threshold is OK.
pub fn evaluate_threshold(value: f64, check: &Check) -> AlertType {
    if check.direction.is_beyond(value, check.error) {
        AlertType::Error
    } else if check.direction.is_beyond(value, check.warn) {
        AlertType::Warn
    } else {
        AlertType::Ok
    }
}

/// Compose an alert record. The timestamp is the time of evaluation, not
/// the sample's own time: the latest real sample may be older than now, and
/// the alert records when the decision was made.
fn build_alert(
    check: &Check,
    target: &str,
    value: f64,
    from_type: AlertType,
    to_type: AlertType,
    now: DateTime<Utc>,
) -> Result<Alert, CheckError> {
    if !value.is_finite() {
        return Err(CheckError::NonFiniteValue {
            target: target.to_string(),
            value,
        });
    }

    Ok(Alert {
        check_id: check.id.clone(),
        target: target.to_string(),
        value,
        warn: check.warn,
        error: check.error,
        from_type,
        to_type,
        timestamp: now,
    })
}

/// Check evaluation errors. Any of these aborts the whole evaluation for
/// that tick; nothing is retried and nothing is partially returned.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error(transparent)]
    Graphite(#[from] GraphiteError),

    #[error("No valid datapoint for target: {target}")]
    NoValidDatapoint { target: String },

    #[error("Non-finite value {value} for target: {target}")]
    NonFiniteValue { target: String, value: f64 },
}
