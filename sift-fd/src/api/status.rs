//! Status endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Current status line, e.g. "Updated 14:05 · 120 items"
    pub status: String,
    pub refreshing: bool,
}

/// GET /api/status
///
/// Snapshot of the evolving status string. Eventually consistent; reads
/// "Not yet refreshed" until the first cycle completes.
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: state.refresh.status.read().await.clone(),
        refreshing: state.refresh.gate.is_refreshing(),
    })
}

/// Build status routes
pub fn status_routes() -> Router<AppState> {
    Router::new().route("/api/status", get(get_status))
}
