//! Health and request-log endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use super::envelope::ApiResponse;
use super::request_log::ApiRequestLog;
use super::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub navigation_loaded: bool,
}

/// GET /health
///
/// Process liveness only; the database is not probed.
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthStatus>> {
    Json(ApiResponse::ok(HealthStatus {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        navigation_loaded: state.navigation.is_loaded(),
    }))
}

/// GET /api/logs
pub async fn list_logs(State(state): State<AppState>) -> Json<ApiResponse<Vec<ApiRequestLog>>> {
    Json(ApiResponse::ok(state.request_log.snapshot().await))
}

/// DELETE /api/logs
pub async fn clear_logs(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<()>>) {
    state.request_log.clear().await;
    (StatusCode::OK, Json(ApiResponse::ok(())))
}
