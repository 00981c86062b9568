//! Rank recomputation
//!
//! `rank = relevance + sum of tag weights + source weight`, recomputed for
//! every scored item on each pass. The pass is deterministic and idempotent
//! given the current weights, so triggering it twice in a row is harmless.

use sift_common::Result;
use sqlx::SqlitePool;
use std::collections::HashMap;

use crate::db::weights;

/// Recompute the rank of every scored item.
///
/// Runs inside a single transaction: concurrent ranked reads observe either
/// the previous rank set or the new one, never a mix. Unscored items are
/// left untouched.
pub async fn recompute_all(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool.begin().await?;

    let tag_weights = weights::all_tag_weights(&mut *tx).await?;
    let source_weights = weights::all_source_weights(&mut *tx).await?;

    let items: Vec<(i64, String, String, i64)> =
        sqlx::query_as("SELECT id, tags, source, relevance FROM items WHERE scored = 1")
            .fetch_all(&mut *tx)
            .await?;

    let count = items.len();
    for (id, tags_json, source, relevance) in items {
        let rank = compute_rank(relevance, &tags_json, &source, &tag_weights, &source_weights);

        sqlx::query("UPDATE items SET rank_value = ? WHERE id = ?")
            .bind(rank)
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    tracing::debug!(items = count, "Rank recompute complete");

    Ok(())
}

/// Rank formula for a single item. Unknown tags and sources contribute 0.
fn compute_rank(
    relevance: i64,
    tags_json: &str,
    source: &str,
    tag_weights: &HashMap<String, f64>,
    source_weights: &HashMap<String, f64>,
) -> f64 {
    let tags: Vec<String> = serde_json::from_str(tags_json).unwrap_or_default();

    let tag_sum: f64 = tags
        .iter()
        .map(|tag| tag_weights.get(tag).copied().unwrap_or(0.0))
        .sum();
    let source_weight = source_weights.get(source).copied().unwrap_or(0.0);

    relevance as f64 + tag_sum + source_weight
}
