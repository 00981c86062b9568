//! Item lifecycle models
//!
//! An item moves through three shapes: `FeedItem` (collected, not yet
//! persisted), `Item` (stored row), and `RankedItem` (digest read DTO
//! annotated with the caller's latest vote).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A collected entry as persisted in the store.
///
/// Items are never deleted. `scored` flips to true exactly once, after the
/// summarizer has run; `rank` is rewritten on every rescoring pass.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Item {
    pub id: i64,
    /// Source URL, unique across the table (dedup key)
    pub url: String,
    pub title: String,
    /// Human-readable source name (feed title or host)
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub snippet: String,
    pub summary: Option<String>,
    pub rationale: Option<String>,
    /// JSON array text, e.g. `["automation","agents"]`
    pub tags: String,
    /// Topic relevance estimate, 0..=100
    pub relevance: i64,
    #[sqlx(rename = "rank_value")]
    pub rank: f64,
    pub scored: bool,
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Decode the stored JSON tag array. Malformed text yields no tags.
    pub fn tag_list(&self) -> Vec<String> {
        serde_json::from_str(&self.tags).unwrap_or_default()
    }
}

/// Candidate entry produced by the collector, before persistence
#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub title: String,
    pub url: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub snippet: String,
}

/// Per-item curation result produced by a summarizer
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryOutcome {
    pub summary: String,
    pub rationale: String,
    pub tags: Vec<String>,
    pub relevance: i64,
}

/// Digest entry returned by ranked reads
#[derive(Debug, Clone, Serialize)]
pub struct RankedItem {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub summary: Option<String>,
    pub rationale: Option<String>,
    pub tags: Vec<String>,
    pub relevance: i64,
    pub rank: f64,
    /// Most recent vote recorded for this item, if any
    pub user_vote: Option<i64>,
}
