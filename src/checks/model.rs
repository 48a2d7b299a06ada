//! Check and alert domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Alert severity / check state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertType {
    Ok,
    Warn,
    Error,
    /// Initial marker for checks that have never been evaluated
    Unknown,
}

impl AlertType {
    /// Canonical uppercase name, as persisted and served over the API
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Ok => "OK",
            AlertType::Warn => "WARN",
            AlertType::Error => "ERROR",
            AlertType::Unknown => "UNKNOWN",
        }
    }

    /// Case-insensitive parse, used by the `states` query filter
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "OK" => Some(AlertType::Ok),
            "WARN" => Some(AlertType::Warn),
            "ERROR" => Some(AlertType::Error),
            "UNKNOWN" => Some(AlertType::Unknown),
            _ => None,
        }
    }

    /// Ranking used to collapse multi-series outcomes to a single state
    pub fn severity(&self) -> u8 {
        match self {
            AlertType::Ok => 0,
            AlertType::Unknown => 1,
            AlertType::Warn => 2,
            AlertType::Error => 3,
        }
    }
}

impl Default for AlertType {
    fn default() -> Self {
        AlertType::Ok
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of a threshold counts as alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdDirection {
    /// Alert when the metric rises above the threshold
    GreaterThan,
    /// Alert when the metric falls below the threshold
    LessThan,
}

impl ThresholdDirection {
    /// Whether `value` is beyond `threshold`. The threshold itself is not
    /// beyond, for warn and error alike.
    pub fn is_beyond(&self, value: f64, threshold: f64) -> bool {
        match self {
            ThresholdDirection::GreaterThan => value > threshold,
            ThresholdDirection::LessThan => value < threshold,
        }
    }
}

/// A monitored target definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Check {
    /// Unique check ID, assigned by the store on create
    #[serde(default)]
    pub id: String,
    /// Human-readable name
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Target expression submitted to the backend; may expand to several
    /// concrete series
    pub target: String,
    /// Warn threshold
    pub warn: f64,
    /// Error threshold
    pub error: f64,
    /// Comparison direction for both thresholds
    pub direction: ThresholdDirection,
    /// Whether the scheduler evaluates this check
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Committed alert state, updated by the caller after evaluation.
    /// Defaults to OK when absent on create.
    #[serde(default)]
    pub state: AlertType,
}

fn default_enabled() -> bool {
    true
}

impl Check {
    /// Create a new check
    pub fn new(
        name: impl Into<String>,
        target: impl Into<String>,
        warn: f64,
        error: f64,
        direction: ThresholdDirection,
    ) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            description: None,
            target: target.into(),
            warn,
            error,
            direction,
            enabled: true,
            state: AlertType::Ok,
        }
    }

    /// Set the check ID
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the committed state
    pub fn with_state(mut self, state: AlertType) -> Self {
        self.state = state;
        self
    }

    /// Set enabled state
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Immutable record of one evaluation outcome for one resolved series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// ID of the check that produced this alert
    pub check_id: String,
    /// Resolved concrete series name; differs from the check's target
    /// expression under wildcard expansion
    pub target: String,
    /// Latest observed value
    pub value: f64,
    pub warn: f64,
    pub error: f64,
    /// Check state at the start of evaluation, shared by every alert in the
    /// batch
    pub from_type: AlertType,
    /// State computed for this series
    pub to_type: AlertType,
    /// Time of evaluation, not of the sample
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    /// Whether this alert records a state change
    pub fn is_transition(&self) -> bool {
        self.from_type != self.to_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_type_parse_case_insensitive() {
        assert_eq!(AlertType::parse("ok"), Some(AlertType::Ok));
        assert_eq!(AlertType::parse("Warn"), Some(AlertType::Warn));
        assert_eq!(AlertType::parse(" ERROR "), Some(AlertType::Error));
        assert_eq!(AlertType::parse("unknown"), Some(AlertType::Unknown));
        assert_eq!(AlertType::parse("bogus"), None);
    }

    #[test]
    fn test_alert_type_serde_uppercase() {
        assert_eq!(serde_json::to_string(&AlertType::Warn).unwrap(), "\"WARN\"");
        let state: AlertType = serde_json::from_str("\"ERROR\"").unwrap();
        assert_eq!(state, AlertType::Error);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(AlertType::Error.severity() > AlertType::Warn.severity());
        assert!(AlertType::Warn.severity() > AlertType::Unknown.severity());
        assert!(AlertType::Unknown.severity() > AlertType::Ok.severity());
    }

    #[test]
    fn test_is_beyond_greater_than() {
        let dir = ThresholdDirection::GreaterThan;
        assert!(dir.is_beyond(90.1, 90.0));
        assert!(!dir.is_beyond(90.0, 90.0));
        assert!(!dir.is_beyond(89.9, 90.0));
    }

    #[test]
    fn test_is_beyond_less_than() {
        let dir = ThresholdDirection::LessThan;
        assert!(dir.is_beyond(9.9, 10.0));
        assert!(!dir.is_beyond(10.0, 10.0));
        assert!(!dir.is_beyond(10.1, 10.0));
    }

    #[test]
    fn test_check_builder() {
        let check = Check::new(
            "High CPU",
            "servers.web01.cpu.load",
            70.0,
            90.0,
            ThresholdDirection::GreaterThan,
        )
        .with_id("cpu-1")
        .with_enabled(false);

        assert_eq!(check.id, "cpu-1");
        assert_eq!(check.state, AlertType::Ok);
        assert!(!check.enabled);
    }

    #[test]
    fn test_check_state_defaults_to_ok() {
        let check: Check = serde_json::from_str(
            r#"{
                "name": "High CPU",
                "target": "servers.*.cpu.load",
                "warn": 70.0,
                "error": 90.0,
                "direction": "greater_than"
            }"#,
        )
        .unwrap();

        assert_eq!(check.state, AlertType::Ok);
        assert!(check.enabled);
        assert!(check.id.is_empty());
    }
}
