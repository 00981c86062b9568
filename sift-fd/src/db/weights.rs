//! Tag and source weight accumulators
//!
//! Weights are lazily created key/value rows clamped to [-10.0, +10.0].
//! Unseen keys read as 0.0. All functions are generic over the executor so
//! they can run against the pool or inside an open transaction.

use sift_common::Result;
use sqlx::Sqlite;
use std::collections::HashMap;

/// Lower bound for accumulated weights
pub const WEIGHT_MIN: f64 = -10.0;
/// Upper bound for accumulated weights
pub const WEIGHT_MAX: f64 = 10.0;

/// Add `delta` to a tag weight, clamping the result
pub async fn adjust_tag_weight<'e, E>(executor: E, tag: &str, delta: f64) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO tag_weights (tag, weight)
        VALUES (?1, MAX(-10.0, MIN(10.0, ?2)))
        ON CONFLICT(tag) DO UPDATE SET
            weight = MAX(-10.0, MIN(10.0, tag_weights.weight + ?2))
        "#,
    )
    .bind(tag)
    .bind(delta)
    .execute(executor)
    .await?;

    Ok(())
}

/// Add `delta` to a source weight, clamping the result
pub async fn adjust_source_weight<'e, E>(executor: E, source: &str, delta: f64) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO source_weights (source, weight)
        VALUES (?1, MAX(-10.0, MIN(10.0, ?2)))
        ON CONFLICT(source) DO UPDATE SET
            weight = MAX(-10.0, MIN(10.0, source_weights.weight + ?2))
        "#,
    )
    .bind(source)
    .bind(delta)
    .execute(executor)
    .await?;

    Ok(())
}

/// Current weight for a tag (0.0 when the tag has never been voted on)
pub async fn get_tag_weight<'e, E>(executor: E, tag: &str) -> Result<f64>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let weight: Option<f64> = sqlx::query_scalar("SELECT weight FROM tag_weights WHERE tag = ?")
        .bind(tag)
        .fetch_optional(executor)
        .await?;

    Ok(weight.unwrap_or(0.0))
}

/// Current weight for a source (0.0 when the source has never been voted on)
pub async fn get_source_weight<'e, E>(executor: E, source: &str) -> Result<f64>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let weight: Option<f64> =
        sqlx::query_scalar("SELECT weight FROM source_weights WHERE source = ?")
            .bind(source)
            .fetch_optional(executor)
            .await?;

    Ok(weight.unwrap_or(0.0))
}

/// Load every tag weight into a map
pub async fn all_tag_weights<'e, E>(executor: E) -> Result<HashMap<String, f64>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows: Vec<(String, f64)> = sqlx::query_as("SELECT tag, weight FROM tag_weights")
        .fetch_all(executor)
        .await?;

    Ok(rows.into_iter().collect())
}

/// Load every source weight into a map
pub async fn all_source_weights<'e, E>(executor: E) -> Result<HashMap<String, f64>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows: Vec<(String, f64)> = sqlx::query_as("SELECT source, weight FROM source_weights")
        .fetch_all(executor)
        .await?;

    Ok(rows.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_pool;

    #[tokio::test]
    async fn unseen_keys_read_zero() {
        let pool = init_memory_pool().await.unwrap();

        assert_eq!(get_tag_weight(&pool, "never-voted").await.unwrap(), 0.0);
        assert_eq!(get_source_weight(&pool, "never-voted").await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn adjust_accumulates() {
        let pool = init_memory_pool().await.unwrap();

        adjust_tag_weight(&pool, "agents", 1.0).await.unwrap();
        adjust_tag_weight(&pool, "agents", 1.0).await.unwrap();
        adjust_tag_weight(&pool, "agents", -1.0).await.unwrap();

        assert_eq!(get_tag_weight(&pool, "agents").await.unwrap(), 1.0);
    }

    #[tokio::test]
    async fn repeated_upvotes_clamp_at_upper_bound() {
        let pool = init_memory_pool().await.unwrap();

        for _ in 0..50 {
            adjust_tag_weight(&pool, "agents", 1.0).await.unwrap();
        }

        assert_eq!(get_tag_weight(&pool, "agents").await.unwrap(), WEIGHT_MAX);
    }

    #[tokio::test]
    async fn repeated_downvotes_clamp_at_lower_bound() {
        let pool = init_memory_pool().await.unwrap();

        for _ in 0..50 {
            adjust_source_weight(&pool, "Spam Feed", -1.0).await.unwrap();
        }

        assert_eq!(
            get_source_weight(&pool, "Spam Feed").await.unwrap(),
            WEIGHT_MIN
        );
    }

    #[tokio::test]
    async fn all_weights_returns_every_row() {
        let pool = init_memory_pool().await.unwrap();

        adjust_tag_weight(&pool, "a", 2.0).await.unwrap();
        adjust_tag_weight(&pool, "b", -3.0).await.unwrap();

        let weights = all_tag_weights(&pool).await.unwrap();
        assert_eq!(weights.len(), 2);
        assert_eq!(weights["a"], 2.0);
        assert_eq!(weights["b"], -3.0);
    }
}
