//! Ranked digest endpoint

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::models::RankedItem;
use crate::{db, AppState};

/// Hard cap on requested digest size
const MAX_DIGEST_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct DigestParams {
    /// Number of items to return; defaults to the configured digest size
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DigestResponse {
    pub items: Vec<RankedItem>,
    pub count: usize,
}

/// GET /api/digest?limit=N
///
/// Top scored items, rank descending, annotated with the caller's latest
/// vote. Out-of-range limits are clamped to [1, 100].
pub async fn get_digest(
    State(state): State<AppState>,
    Query(params): Query<DigestParams>,
) -> ApiResult<Json<DigestResponse>> {
    let limit = params
        .limit
        .unwrap_or(state.refresh.config.digest_limit)
        .clamp(1, MAX_DIGEST_LIMIT);

    let items = db::items::fetch_ranked(state.pool(), limit).await?;

    Ok(Json(DigestResponse {
        count: items.len(),
        items,
    }))
}

/// Build digest routes
pub fn digest_routes() -> Router<AppState> {
    Router::new().route("/api/digest", get(get_digest))
}
