//! Feedback endpoint

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::{db, ranking, AppState};

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub item_id: i64,
    /// +1 or -1
    pub vote: i64,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub success: bool,
    pub message: String,
}

/// POST /api/feedback
///
/// Records the vote, then recomputes ranks before responding so the next
/// digest read reflects it. The write + rescore pair holds the vote lock,
/// serializing it against other feedback writes.
pub async fn post_feedback(
    State(state): State<AppState>,
    Json(payload): Json<FeedbackRequest>,
) -> ApiResult<Json<FeedbackResponse>> {
    let _lock = state.vote_lock.lock().await;

    db::feedback::record_vote(state.pool(), payload.item_id, payload.vote).await?;
    ranking::recompute_all(state.pool()).await?;

    tracing::info!(item_id = payload.item_id, vote = payload.vote, "Feedback recorded");

    Ok(Json(FeedbackResponse {
        success: true,
        message: "Vote recorded".to_string(),
    }))
}

/// Build feedback routes
pub fn feedback_routes() -> Router<AppState> {
    Router::new().route("/api/feedback", post(post_feedback))
}
