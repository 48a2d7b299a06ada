//! Graphwatch: Threshold Alerting for Graphite Metrics
//!
//! Evaluates monitored metric targets against configurable warn/error
//! thresholds and emits alert records reflecting state transitions. Checks
//! are stored in memory, managed over a REST API, and evaluated on a fixed
//! cadence by a background scheduler against a Graphite render endpoint.
//!
//! # Features
//!
//! - **Latest-sample extraction**: Scans sparse series newest to oldest for
//!   the freshest real measurement; gaps are never treated as zero
//! - **Directional thresholds**: Alert when a metric rises above or falls
//!   below its warn/error levels, error taking priority
//! - **Wildcard targets**: One check may expand to many concrete series,
//!   producing one alert record per series
//! - **Fail-fast evaluation**: A check covering several series either
//!   evaluates completely or not at all
//! - **Transition notifications**: Log or webhook dispatch when a check
//!   changes state
//!
//! # Example
//!
//! ```no_run
//! use graphwatch::checks::{Check, CheckEvaluator, ThresholdDirection};
//! use graphwatch::graphite::{GraphiteClient, GraphiteConfig};
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), graphwatch::checks::CheckError> {
//! let graphite = Arc::new(GraphiteClient::new(GraphiteConfig {
//!     base_url: "http://graphite:8080".to_string(),
//!     ..GraphiteConfig::default()
//! }));
//! let evaluator = CheckEvaluator::new(graphite);
//!
//! let check = Check::new(
//!     "High CPU",
//!     "servers.*.cpu.load",
//!     70.0,
//!     90.0,
//!     ThresholdDirection::GreaterThan,
//! );
//!
//! for alert in evaluator.evaluate(&check).await? {
//!     println!("{}: {} -> {}", alert.target, alert.from_type, alert.to_type);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod checks;
pub mod graphite;
pub mod notify;
pub mod scheduler;
pub mod store;

// Re-export commonly used types
pub use checks::{Alert, AlertType, Check, CheckError, CheckEvaluator, ThresholdDirection};
pub use graphite::{GraphiteClient, GraphiteConfig, GraphiteError, Series};
pub use store::CheckStore;
