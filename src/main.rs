//! Graphwatch Server
//!
//! Run with: cargo run
//!
//! Environment variables:
//! - GRAPHWATCH_HOST: Bind address (default: 0.0.0.0)
//! - GRAPHWATCH_PORT: Port number (default: 8080)
//! - GRAPHWATCH_GRAPHITE_URL: Graphite web endpoint (default: http://localhost:8080)
//! - GRAPHWATCH_GRAPHITE_TIMEOUT_SECS: Render request timeout (default: 30)
//! - GRAPHWATCH_MAX_GRAPHITE_CONNECTIONS: Ceiling on simultaneous backend
//!   connections (default: 20)
//! - GRAPHWATCH_CHECK_INTERVAL_SECS: Scheduler tick interval (default: 60)
//! - GRAPHWATCH_WEBHOOK_URL: Optional webhook notified on state transitions
//! - RUST_LOG: Log level (default: info)

use std::time::Duration;

use graphwatch::api::{run_server, ServerConfig};
use graphwatch::graphite::GraphiteConfig;
use graphwatch::notify::NotifyTarget;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "graphwatch=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse configuration from environment
    let host = std::env::var("GRAPHWATCH_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("GRAPHWATCH_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let graphite_url = std::env::var("GRAPHWATCH_GRAPHITE_URL")
        .unwrap_or_else(|_| "http://localhost:8080".to_string());
    let graphite_timeout_secs: u64 = std::env::var("GRAPHWATCH_GRAPHITE_TIMEOUT_SECS")
        .ok()
        .and_then(|t| t.parse().ok())
        .unwrap_or(30);
    let max_connections: usize = std::env::var("GRAPHWATCH_MAX_GRAPHITE_CONNECTIONS")
        .ok()
        .and_then(|m| m.parse().ok())
        .unwrap_or(20);

    let check_interval_secs: u64 = std::env::var("GRAPHWATCH_CHECK_INTERVAL_SECS")
        .ok()
        .and_then(|i| i.parse().ok())
        .unwrap_or(60);

    // Always log transitions; add a webhook when configured
    let mut notify_targets = vec![NotifyTarget::Log];
    if let Ok(url) = std::env::var("GRAPHWATCH_WEBHOOK_URL") {
        notify_targets.push(NotifyTarget::Webhook {
            url,
            headers: Default::default(),
        });
    }

    let config = ServerConfig {
        host,
        port,
        graphite: GraphiteConfig {
            base_url: graphite_url,
            timeout: Duration::from_secs(graphite_timeout_secs),
            max_connections,
        },
        check_interval_secs,
        notify_targets,
    };

    tracing::info!("Graphwatch configuration:");
    tracing::info!("  Host: {}:{}", config.host, config.port);
    tracing::info!("  Graphite: {}", config.graphite.base_url);
    tracing::info!(
        "  Graphite connection ceiling: {}",
        config.graphite.max_connections
    );
    tracing::info!("  Check interval: {} seconds", config.check_interval_secs);
    tracing::info!("  Notification targets: {}", config.notify_targets.len());

    println!(
        r#"
 graphwatch
 Threshold Alerting for Graphite Metrics
 Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );

    run_server(config).await
}
