use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::checks::Check;
use crate::store::{filter_enabled, CheckStore};

/// Application state shared across handlers
pub struct AppState {
    pub store: Arc<CheckStore>,
}

// ============================================================================
// Health Check
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Checks CRUD
// ============================================================================

#[derive(Deserialize)]
pub struct ChecksQuery {
    /// Comma-separated, case-insensitive state filter
    pub states: Option<String>,
    /// Applied after the state filter
    pub enabled: Option<bool>,
}

pub async fn list_checks(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ChecksQuery>,
) -> Json<Vec<Check>> {
    let checks = match params.states {
        Some(ref states) => state.store.get_checks_by_state(&parse_states(states)),
        None => state.store.get_checks(),
    };

    let checks = match params.enabled {
        Some(enabled) => filter_enabled(checks, enabled),
        None => checks,
    };

    Json(checks)
}

pub async fn create_check(
    State(state): State<Arc<AppState>>,
    Json(check): Json<Check>,
) -> impl IntoResponse {
    // Missing state and enabled fields default at deserialization: OK, true
    let stored = state.store.create_check(check);
    let location = format!("checks/{}", stored.id);

    (
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(stored),
    )
}

pub async fn get_check(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Check>, ApiError> {
    let check = state
        .store
        .get_check(&id)
        .ok_or_else(|| ApiError::NotFound(format!("Check '{}' not found", id)))?;

    Ok(Json(check))
}

pub async fn update_check(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(mut check): Json<Check>,
) -> Result<Json<Check>, ApiError> {
    check.id = id.clone();
    let stored = state
        .store
        .save_check(check)
        .ok_or_else(|| ApiError::NotFound(format!("Check '{}' not found", id)))?;

    Ok(Json(stored))
}

pub async fn delete_check(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> StatusCode {
    state.store.delete_check(&id);
    StatusCode::NO_CONTENT
}

/// Uppercase the comma-separated `states` filter for store lookup
fn parse_states(states: &str) -> HashSet<String> {
    states
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().to_uppercase())
        .collect()
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_states() {
        let states = parse_states("ok,Warn, ERROR");
        assert!(states.contains("OK"));
        assert!(states.contains("WARN"));
        assert!(states.contains("ERROR"));
        assert_eq!(states.len(), 3);
    }

    #[test]
    fn test_parse_states_skips_empty_segments() {
        let states = parse_states("ok,,warn,");
        assert_eq!(states.len(), 2);
    }
}
