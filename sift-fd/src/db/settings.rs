//! Settings database operations
//!
//! Key-value persistence for the summarizer credential. The stored value is
//! never logged.

use sift_common::Result;
use sqlx::SqlitePool;

const LLM_API_KEY: &str = "llm_api_key";

/// Get the stored LLM API key, if one has been saved
pub async fn get_llm_api_key(pool: &SqlitePool) -> Result<Option<String>> {
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(LLM_API_KEY)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|(value,)| value))
}

/// Store the LLM API key (UPSERT)
pub async fn set_llm_api_key(pool: &SqlitePool, key: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(LLM_API_KEY)
    .bind(key)
    .execute(pool)
    .await?;

    Ok(())
}

/// Remove the stored LLM API key
pub async fn clear_llm_api_key(pool: &SqlitePool) -> Result<()> {
    sqlx::query("DELETE FROM settings WHERE key = ?")
        .bind(LLM_API_KEY)
        .execute(pool)
        .await?;

    Ok(())
}
