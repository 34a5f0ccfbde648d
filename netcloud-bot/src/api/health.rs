//! Liveness endpoints for external uptime monitoring

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

/// Body of `GET /`
pub const RUNNING_MESSAGE: &str = "NetCloud Bot API is running!";

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    /// Seconds since the process started
    pub uptime_seconds: u64,
}

/// GET /
pub async fn home() -> (StatusCode, &'static str) {
    (StatusCode::OK, RUNNING_MESSAGE)
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);

    Json(HealthResponse {
        status: "ok".to_string(),
        module: "netcloud-bot".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime.num_seconds().max(0) as u64,
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health_check))
}
