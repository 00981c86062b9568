//! Feedback recording
//!
//! Feedback events are append-only. Recording a vote also folds it into the
//! item's tag and source weights, all inside one transaction so a failure
//! leaves no partial mutation behind.

use chrono::Utc;
use sift_common::{Error, Result};
use sqlx::SqlitePool;

use crate::db::weights;

/// Record a vote for an item and adjust the associated weights.
///
/// `vote` must be exactly +1 or -1. Unknown items are rejected without
/// recording anything. Does not rescore; the caller decides when to trigger
/// a recompute.
pub async fn record_vote(pool: &SqlitePool, item_id: i64, vote: i64) -> Result<()> {
    if vote != 1 && vote != -1 {
        return Err(Error::InvalidInput(format!(
            "vote must be +1 or -1, got {}",
            vote
        )));
    }

    let mut tx = pool.begin().await?;

    let row: Option<(String, String)> =
        sqlx::query_as("SELECT tags, source FROM items WHERE id = ?")
            .bind(item_id)
            .fetch_optional(&mut *tx)
            .await?;

    // Dropping the transaction on the error path rolls it back
    let (tags_json, source) = match row {
        Some(row) => row,
        None => return Err(Error::NotFound(format!("item {}", item_id))),
    };

    sqlx::query("INSERT INTO feedback (item_id, vote, created_at) VALUES (?, ?, ?)")
        .bind(item_id)
        .bind(vote)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

    let tags: Vec<String> = serde_json::from_str(&tags_json).unwrap_or_default();
    for tag in &tags {
        weights::adjust_tag_weight(&mut *tx, tag, vote as f64).await?;
    }
    weights::adjust_source_weight(&mut *tx, &source, vote as f64).await?;

    tx.commit().await?;

    Ok(())
}
