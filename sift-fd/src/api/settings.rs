//! Settings API endpoints
//!
//! GET and POST for the summarizer credential. Responses only ever carry a
//! masked rendering of the key; the full value is never echoed or logged.

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::config::{self, KeySource};
use crate::error::ApiResult;
use crate::{db, AppState};

/// Request payload for setting the LLM API key
#[derive(Debug, Deserialize)]
pub struct SetKeyRequest {
    /// The key to store; an empty string clears the stored key
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub struct SetKeyResponse {
    pub success: bool,
    pub message: String,
}

/// Current key status for display
#[derive(Debug, Serialize)]
pub struct KeyStatusResponse {
    pub configured: bool,
    /// Masked rendering, never the full value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masked_key: Option<String>,
    /// "env", "store" or "none"
    pub source: &'static str,
}

/// GET /api/settings/llm_api_key
pub async fn get_llm_api_key(
    State(state): State<AppState>,
) -> ApiResult<Json<KeyStatusResponse>> {
    let (key, source) = config::resolve_llm_api_key(state.pool()).await?;

    Ok(Json(KeyStatusResponse {
        configured: key.is_some(),
        masked_key: key.as_deref().map(mask_key),
        source: source.as_str(),
    }))
}

/// POST /api/settings/llm_api_key
///
/// Persists the key in the settings table. An empty (or whitespace-only)
/// value clears the stored key instead. An environment-provided key still
/// takes precedence at resolution time.
pub async fn set_llm_api_key(
    State(state): State<AppState>,
    Json(payload): Json<SetKeyRequest>,
) -> ApiResult<Json<SetKeyResponse>> {
    let key = payload.api_key.trim();

    if key.is_empty() {
        db::settings::clear_llm_api_key(state.pool()).await?;
        tracing::info!("LLM API key cleared");
        return Ok(Json(SetKeyResponse {
            success: true,
            message: "Key cleared; new items will use keyword-only mode".to_string(),
        }));
    }

    db::settings::set_llm_api_key(state.pool(), key).await?;
    tracing::info!("LLM API key saved");

    if matches!(
        config::resolve_llm_api_key(state.pool()).await?.1,
        KeySource::Env
    ) {
        return Ok(Json(SetKeyResponse {
            success: true,
            message: "Key saved, but the environment variable still takes precedence"
                .to_string(),
        }));
    }

    Ok(Json(SetKeyResponse {
        success: true,
        message: "Key saved; new items will use AI summaries".to_string(),
    }))
}

/// Mask a credential for display. Long keys keep head and tail context;
/// short keys are fully hidden.
fn mask_key(key: &str) -> String {
    if key.chars().count() > 16 {
        let head: String = key.chars().take(8).collect();
        let tail_rev: Vec<char> = key.chars().rev().take(4).collect();
        let tail: String = tail_rev.into_iter().rev().collect();
        format!("{}…{}", head, tail)
    } else {
        "…".to_string()
    }
}

/// Build settings routes
pub fn settings_routes() -> Router<AppState> {
    Router::new().route(
        "/api/settings/llm_api_key",
        get(get_llm_api_key).post(set_llm_api_key),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_keys_show_head_and_tail_only() {
        let masked = mask_key("sk-abcdefghijklmnopqrstuvwxyz");
        assert_eq!(masked, "sk-abcde…wxyz");
        assert!(!masked.contains("fghij"));
    }

    #[test]
    fn short_keys_are_fully_hidden() {
        assert_eq!(mask_key("short-key"), "…");
    }

    #[test]
    fn masked_key_never_equals_input() {
        for key in ["sk-abcdefghijklmnopqrstuvwxyz", "tiny", ""] {
            assert_ne!(mask_key(key), key);
        }
    }
}
