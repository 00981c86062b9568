//! Item table operations

use chrono::Utc;
use sift_common::{Error, Result};
use sqlx::SqlitePool;

use crate::models::{FeedItem, Item, RankedItem, SummaryOutcome};

/// Insert a collected candidate, deduplicating by URL.
///
/// Returns `true` if the item was new, `false` if an item with the same URL
/// already exists (the insert is a no-op in that case).
pub async fn insert_candidate(pool: &SqlitePool, candidate: &FeedItem) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO items (url, title, source, published_at, snippet, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(url) DO NOTHING
        "#,
    )
    .bind(&candidate.url)
    .bind(&candidate.title)
    .bind(&candidate.source)
    .bind(candidate.published_at)
    .bind(&candidate.snippet)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Fetch up to `limit` unscored items, most recently created first
pub async fn unscored_batch(pool: &SqlitePool, limit: i64) -> Result<Vec<Item>> {
    let items = sqlx::query_as::<_, Item>(
        "SELECT * FROM items WHERE scored = 0 ORDER BY created_at DESC, id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(items)
}

/// Persist a summarizer outcome and mark the item scored
pub async fn apply_summary(pool: &SqlitePool, item_id: i64, outcome: &SummaryOutcome) -> Result<()> {
    let tags_json = serde_json::to_string(&outcome.tags)
        .map_err(|e| Error::Internal(format!("Tag serialization failed: {}", e)))?;

    sqlx::query(
        r#"
        UPDATE items
        SET summary = ?, rationale = ?, tags = ?, relevance = ?, scored = 1
        WHERE id = ?
        "#,
    )
    .bind(&outcome.summary)
    .bind(&outcome.rationale)
    .bind(tags_json)
    .bind(outcome.relevance)
    .bind(item_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch a single item by id
pub async fn get_item(pool: &SqlitePool, item_id: i64) -> Result<Option<Item>> {
    let item = sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = ?")
        .bind(item_id)
        .fetch_optional(pool)
        .await?;

    Ok(item)
}

/// Total number of stored items
pub async fn count_items(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Row shape for the ranked read (items joined with the latest vote)
#[derive(sqlx::FromRow)]
struct RankedRow {
    id: i64,
    url: String,
    title: String,
    source: String,
    published_at: chrono::DateTime<Utc>,
    summary: Option<String>,
    rationale: Option<String>,
    tags: String,
    relevance: i64,
    rank_value: f64,
    user_vote: Option<i64>,
}

/// Fetch the top `limit` scored items, rank descending.
///
/// Ties break toward the more recently created item. Each row carries the
/// caller's most recent vote as a read-side annotation.
pub async fn fetch_ranked(pool: &SqlitePool, limit: i64) -> Result<Vec<RankedItem>> {
    let rows = sqlx::query_as::<_, RankedRow>(
        r#"
        SELECT
            id, url, title, source, published_at, summary, rationale,
            tags, relevance, rank_value,
            (SELECT vote FROM feedback
             WHERE feedback.item_id = items.id
             ORDER BY feedback.created_at DESC, feedback.id DESC
             LIMIT 1) AS user_vote
        FROM items
        WHERE scored = 1
        ORDER BY rank_value DESC, created_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| RankedItem {
            id: row.id,
            url: row.url,
            title: row.title,
            source: row.source,
            published_at: row.published_at,
            summary: row.summary,
            rationale: row.rationale,
            tags: serde_json::from_str(&row.tags).unwrap_or_default(),
            relevance: row.relevance,
            rank: row.rank_value,
            user_vote: row.user_vote,
        })
        .collect())
}
