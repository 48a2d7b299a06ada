use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    create_check, delete_check, get_check, health_check, list_checks, update_check, AppState,
};
use crate::checks::CheckEvaluator;
use crate::graphite::{GraphiteClient, GraphiteConfig};
use crate::notify::{Notifier, NotifyTarget};
use crate::scheduler::CheckScheduler;
use crate::store::CheckStore;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub graphite: GraphiteConfig,
    pub check_interval_secs: u64,
    pub notify_targets: Vec<NotifyTarget>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            graphite: GraphiteConfig::default(),
            check_interval_secs: 60,
            notify_targets: vec![NotifyTarget::Log],
        }
    }
}

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Check CRUD
        .route("/checks", get(list_checks))
        .route("/checks", post(create_check))
        .route("/checks/:id", get(get_check))
        .route("/checks/:id", put(update_check))
        .route("/checks/:id", delete(delete_check))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Shared check store
    let store = Arc::new(CheckStore::new());

    // Evaluation engine over the Graphite backend
    let graphite = Arc::new(GraphiteClient::new(config.graphite.clone()));
    let evaluator = Arc::new(CheckEvaluator::new(graphite));
    let notifier = Arc::new(Notifier::new(config.notify_targets.clone()));

    // Start the background scheduler
    let mut scheduler = CheckScheduler::new(Arc::clone(&store), evaluator, notifier);
    let scheduler_handle = scheduler.start(std::time::Duration::from_secs(
        config.check_interval_secs,
    ));

    // Build router
    let state = Arc::new(AppState { store });
    let app = build_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("Starting graphwatch server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(scheduler))
        .await?;

    scheduler_handle.abort();

    tracing::info!("graphwatch server stopped");
    Ok(())
}

async fn shutdown_signal(mut scheduler: CheckScheduler) {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");

    tracing::info!("Shutdown signal received, stopping scheduler...");
    scheduler.stop().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{AlertType, Check, ThresholdDirection};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::util::ServiceExt;

    fn create_test_app() -> (Arc<CheckStore>, Router) {
        let store = Arc::new(CheckStore::new());
        let app = build_router(Arc::new(AppState {
            store: Arc::clone(&store),
        }));
        (store, app)
    }

    fn cpu_check() -> Check {
        Check::new(
            "High CPU",
            "servers.*.cpu.load",
            70.0,
            90.0,
            ThresholdDirection::GreaterThan,
        )
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let (_, app) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_check_sets_location_and_defaults_state() {
        let (_, app) = create_test_app();

        // No state in the body: defaults to OK
        let body = serde_json::json!({
            "name": "High CPU",
            "target": "servers.*.cpu.load",
            "warn": 70.0,
            "error": 90.0,
            "direction": "greater_than"
        });

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/checks")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_string(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let location = response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();

        let created = body_json(response).await;
        assert_eq!(created["state"], "OK");
        assert_eq!(location, format!("checks/{}", created["id"].as_str().unwrap()));
    }

    #[tokio::test]
    async fn test_get_check_not_found() {
        let (_, app) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/checks/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_check_round_trip() {
        let (store, app) = create_test_app();
        let stored = store.create_check(cpu_check());

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/checks/{}", stored.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let fetched = body_json(response).await;
        assert_eq!(fetched["name"], "High CPU");
        assert_eq!(fetched["direction"], "greater_than");
    }

    #[tokio::test]
    async fn test_list_checks_filters() {
        let (store, app) = create_test_app();
        store.create_check(cpu_check().with_id("a").with_state(AlertType::Error));
        store.create_check(
            cpu_check()
                .with_id("b")
                .with_state(AlertType::Error)
                .with_enabled(false),
        );
        store.create_check(cpu_check().with_id("c").with_state(AlertType::Ok));

        // Case-insensitive states filter, then enabled filter on top
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/checks?states=error,warn&enabled=true")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let checks = body_json(response).await;
        let checks = checks.as_array().unwrap();
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0]["id"], "a");
    }

    #[tokio::test]
    async fn test_list_checks_unfiltered() {
        let (store, app) = create_test_app();
        store.create_check(cpu_check().with_id("a"));
        store.create_check(cpu_check().with_id("b").with_enabled(false));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/checks")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let checks = body_json(response).await;
        assert_eq!(checks.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_check() {
        let (store, app) = create_test_app();
        let stored = store.create_check(cpu_check());

        let mut body = serde_json::to_value(&stored).unwrap();
        body["warn"] = serde_json::json!(50.0);

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri(format!("/checks/{}", stored.id))
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_string(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(store.get_check(&stored.id).unwrap().warn, 50.0);
    }

    #[tokio::test]
    async fn test_update_check_not_found() {
        let (_, app) = create_test_app();

        let body = serde_json::to_value(cpu_check()).unwrap();
        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/checks/nonexistent")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_string(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_check() {
        let (store, app) = create_test_app();
        let stored = store.create_check(cpu_check());

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/checks/{}", stored.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(store.get_check(&stored.id).is_none());
    }
}
