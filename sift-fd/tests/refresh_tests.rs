//! Integration tests for the refresh orchestration
//!
//! Exercises full cycles against an in-memory database with fake
//! collectors and summarizers, including the single-flight gate and
//! failure paths.

use async_trait::async_trait;
use chrono::Utc;
use sift_common::{Error, Result};
use sift_fd::config::{FeedConfig, SiftConfig};
use sift_fd::models::{FeedItem, Item, SummaryOutcome};
use sift_fd::services::refresh::{self, RefreshContext, RefreshGate, INITIAL_STATUS};
use sift_fd::services::{Collector, Summarizer};
use std::sync::Arc;
use tokio::sync::{Notify, RwLock};

struct StaticCollector {
    items: Vec<FeedItem>,
}

#[async_trait]
impl Collector for StaticCollector {
    async fn collect(&self, _feeds: &[FeedConfig], _max_age_days: i64) -> Result<Vec<FeedItem>> {
        Ok(self.items.clone())
    }
}

/// Collector that signals entry and then parks until released, so a test
/// can observe the in-flight state deterministically
struct BlockingCollector {
    started: Arc<Notify>,
    release: Arc<Notify>,
}

#[async_trait]
impl Collector for BlockingCollector {
    async fn collect(&self, _feeds: &[FeedConfig], _max_age_days: i64) -> Result<Vec<FeedItem>> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(Vec::new())
    }
}

struct FailingCollector;

#[async_trait]
impl Collector for FailingCollector {
    async fn collect(&self, _feeds: &[FeedConfig], _max_age_days: i64) -> Result<Vec<FeedItem>> {
        Err(Error::Collaborator(
            "simulated upstream outage with a deliberately long explanation attached".to_string(),
        ))
    }
}

struct FixedSummarizer;

#[async_trait]
impl Summarizer for FixedSummarizer {
    async fn summarize(
        &self,
        items: &[Item],
        _api_key: Option<&str>,
    ) -> Result<Vec<SummaryOutcome>> {
        Ok(items
            .iter()
            .map(|_| SummaryOutcome {
                summary: "summary".to_string(),
                rationale: "rationale".to_string(),
                tags: vec![],
                relevance: 60,
            })
            .collect())
    }
}

struct FailingSummarizer;

#[async_trait]
impl Summarizer for FailingSummarizer {
    async fn summarize(
        &self,
        _items: &[Item],
        _api_key: Option<&str>,
    ) -> Result<Vec<SummaryOutcome>> {
        Err(Error::Collaborator("model endpoint unreachable".to_string()))
    }
}

async fn test_ctx(
    collector: Arc<dyn Collector>,
    summarizer: Arc<dyn Summarizer>,
) -> RefreshContext {
    let pool = sift_fd::db::init_memory_pool().await.unwrap();
    RefreshContext {
        pool,
        config: Arc::new(SiftConfig::default()),
        collector,
        summarizer,
        gate: Arc::new(RefreshGate::new()),
        status: Arc::new(RwLock::new(INITIAL_STATUS.to_string())),
    }
}

fn candidate(url: &str, title: &str) -> FeedItem {
    FeedItem {
        title: title.to_string(),
        url: url.to_string(),
        source: "Fake Feed".to_string(),
        published_at: Utc::now(),
        snippet: "snippet".to_string(),
    }
}

#[tokio::test]
async fn cycle_collects_scores_and_publishes_status() {
    let collector = Arc::new(StaticCollector {
        items: vec![
            candidate("https://e.com/a", "A"),
            candidate("https://e.com/b", "B"),
        ],
    });
    let ctx = test_ctx(collector, Arc::new(FixedSummarizer)).await;

    assert!(refresh::try_refresh(&ctx).await);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE scored = 1")
        .fetch_one(&ctx.pool)
        .await
        .unwrap();
    assert_eq!(count, 2);

    // relevance 60 with no weights gives rank 60
    let rank: f64 = sqlx::query_scalar("SELECT rank_value FROM items WHERE url = 'https://e.com/a'")
        .fetch_one(&ctx.pool)
        .await
        .unwrap();
    assert_eq!(rank, 60.0);

    let status = ctx.status.read().await.clone();
    assert!(status.starts_with("Updated "), "status was: {}", status);
    assert!(status.contains("2 items"), "status was: {}", status);
    assert!(status.contains("· no-key mode"), "status was: {}", status);
}

#[tokio::test]
async fn second_cycle_deduplicates_by_url() {
    let collector = Arc::new(StaticCollector {
        items: vec![candidate("https://e.com/a", "A")],
    });
    let ctx = test_ctx(collector, Arc::new(FixedSummarizer)).await;

    assert!(refresh::try_refresh(&ctx).await);
    assert!(refresh::try_refresh(&ctx).await);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
        .fetch_one(&ctx.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    let status = ctx.status.read().await.clone();
    assert!(status.contains("1 items"), "status was: {}", status);
}

#[tokio::test]
async fn concurrent_trigger_is_dropped_while_cycle_runs() {
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let collector = Arc::new(BlockingCollector {
        started: started.clone(),
        release: release.clone(),
    });
    let ctx = test_ctx(collector, Arc::new(FixedSummarizer)).await;

    let running = {
        let ctx = ctx.clone();
        tokio::spawn(async move { refresh::try_refresh(&ctx).await })
    };
    started.notified().await;

    assert_eq!(ctx.status.read().await.as_str(), "Refreshing…");
    assert!(ctx.gate.is_refreshing());
    assert!(!refresh::try_refresh(&ctx).await);

    release.notify_one();
    assert!(running.await.unwrap());
    assert!(!ctx.gate.is_refreshing());
}

#[tokio::test]
async fn collector_failure_publishes_truncated_message_and_releases_gate() {
    let ctx = test_ctx(Arc::new(FailingCollector), Arc::new(FixedSummarizer)).await;

    assert!(refresh::try_refresh(&ctx).await);

    let status = ctx.status.read().await.clone();
    assert!(
        status.starts_with("Refresh failed – "),
        "status was: {}",
        status
    );
    // prefix (17 chars) plus the truncated message (45 chars max)
    assert!(status.chars().count() <= 17 + 45, "status was: {}", status);

    // A failed cycle must not wedge the gate
    assert!(!ctx.gate.is_refreshing());
    assert!(refresh::try_refresh(&ctx).await);
}

#[tokio::test]
async fn summarizer_failure_leaves_items_unscored() {
    let collector = Arc::new(StaticCollector {
        items: vec![candidate("https://e.com/a", "A")],
    });
    let ctx = test_ctx(collector, Arc::new(FailingSummarizer)).await;

    assert!(refresh::try_refresh(&ctx).await);

    let status = ctx.status.read().await.clone();
    assert!(
        status.starts_with("Refresh failed – "),
        "status was: {}",
        status
    );

    // The candidate survives insertion and stays in the backlog
    let (count, scored): (i64, i64) =
        sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(scored), 0) FROM items")
            .fetch_one(&ctx.pool)
            .await
            .unwrap();
    assert_eq!(count, 1);
    assert_eq!(scored, 0);

    assert!(!ctx.gate.is_refreshing());
}
