//! Manual refresh trigger endpoint

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Serialize;

use crate::services::refresh::try_refresh;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// Whether this trigger started a refresh
    pub started: bool,
    pub message: String,
}

/// POST /api/refresh
///
/// Kicks off a refresh cycle in the background. Always accepted: when a
/// refresh is already running the trigger is dropped and the response says
/// so.
pub async fn post_refresh(
    State(state): State<AppState>,
) -> (StatusCode, Json<RefreshResponse>) {
    if state.refresh.gate.is_refreshing() {
        return (
            StatusCode::ACCEPTED,
            Json(RefreshResponse {
                started: false,
                message: "Refresh already in progress".to_string(),
            }),
        );
    }

    let ctx = state.refresh.clone();
    tokio::spawn(async move {
        try_refresh(&ctx).await;
    });

    (
        StatusCode::ACCEPTED,
        Json(RefreshResponse {
            started: true,
            message: "Refresh started".to_string(),
        }),
    )
}

/// Build refresh routes
pub fn refresh_routes() -> Router<AppState> {
    Router::new().route("/api/refresh", post(post_refresh))
}
