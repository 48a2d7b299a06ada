//! HTTP client for the Graphite render API

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use super::series::Series;

/// Render window: alerting cares only about current state, so every request
/// asks for the same short recent interval
const RENDER_FROM: &str = "-5minutes";
const RENDER_UNTIL: &str = "now";

/// Client configuration
#[derive(Debug, Clone)]
pub struct GraphiteConfig {
    /// Base URL of the Graphite web endpoint, e.g. `http://graphite:8080`
    pub base_url: String,
    /// Per-request timeout (connect + read)
    pub timeout: Duration,
    /// Ceiling on simultaneously open connections to the backend
    pub max_connections: usize,
}

impl Default for GraphiteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(30),
            max_connections: 20,
        }
    }
}

/// Client for fetching series from the Graphite render API.
///
/// Cheap to clone; clones share one pooled HTTP client and one connection
/// permit pool, and may be used concurrently from many tasks.
#[derive(Debug, Clone)]
pub struct GraphiteClient {
    http: reqwest::Client,
    permits: Arc<Semaphore>,
    base_url: String,
}

impl GraphiteClient {
    pub fn new(config: GraphiteConfig) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(config.timeout)
                .build()
                .expect("Failed to create HTTP client"),
            permits: Arc::new(Semaphore::new(config.max_connections)),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch all series matching `target` over the fixed recent window.
    ///
    /// A target expression may expand to zero, one, or many concrete series;
    /// wildcard expansion is a backend capability. Each request carries a
    /// random `uniq` token so intermediate HTTP caches never serve stale
    /// data for repeated identical queries.
    pub async fn fetch(&self, target: &str) -> Result<Vec<Series>, GraphiteError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .expect("connection permit pool closed");

        let url = format!("{}/render", self.base_url);
        let nonce = rand::random::<u64>().to_string();

        let response = self
            .http
            .get(&url)
            .query(&[
                ("from", RENDER_FROM),
                ("until", RENDER_UNTIL),
                ("uniq", nonce.as_str()),
                ("format", "json"),
                ("target", target),
            ])
            .send()
            .await
            .map_err(|e| GraphiteError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GraphiteError::Status(response.status().as_u16()));
        }

        let series = response
            .json::<Vec<Series>>()
            .await
            .map_err(|e| GraphiteError::Parse(e.to_string()))?;

        tracing::debug!(target, count = series.len(), "Fetched series");

        Ok(series)
    }
}

/// Graphite client errors
#[derive(Debug, thiserror::Error)]
pub enum GraphiteError {
    #[error("Graphite request failed: {0}")]
    Http(String),

    #[error("Graphite returned status {0}")]
    Status(u16),

    #[error("Invalid render response: {0}")]
    Parse(String),
}
