//! Refresh orchestration
//!
//! A refresh cycle collects candidates, summarizes the unscored backlog,
//! recomputes ranks and publishes a status line. Cycles are single-flight:
//! a trigger arriving while one is running is accepted and dropped.

use chrono::Local;
use sift_common::text::truncate_chars;
use sift_common::Result;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::{resolve_llm_api_key, SiftConfig};
use crate::db;
use crate::models::FeedItem;
use crate::ranking;
use crate::services::{Collector, Summarizer};

/// Status shown before the first refresh completes
pub const INITIAL_STATUS: &str = "Not yet refreshed";

const FAILURE_MESSAGE_MAX_CHARS: usize = 45;

/// Single-flight guard over the refresh cycle.
///
/// Two states, Idle and Refreshing, switched with an atomic compare-and-set
/// so concurrent triggers cannot both enter the pipeline.
pub struct RefreshGate {
    refreshing: AtomicBool,
}

impl RefreshGate {
    pub fn new() -> Self {
        Self {
            refreshing: AtomicBool::new(false),
        }
    }

    /// Attempt the Idle -> Refreshing transition
    fn try_acquire(&self) -> bool {
        self.refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn release(&self) {
        self.refreshing.store(false, Ordering::Release);
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }
}

impl Default for RefreshGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Releases the gate when dropped, so every exit path returns to Idle
struct GateGuard<'a>(&'a RefreshGate);

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        self.0.release();
    }
}

/// Shared context for refresh cycles, cloned into the scheduler task and
/// the manual-trigger handler
#[derive(Clone)]
pub struct RefreshContext {
    pub pool: SqlitePool,
    pub config: Arc<SiftConfig>,
    pub collector: Arc<dyn Collector>,
    pub summarizer: Arc<dyn Summarizer>,
    pub gate: Arc<RefreshGate>,
    pub status: Arc<RwLock<String>>,
}

struct CycleOutcome {
    total_items: i64,
    no_key: bool,
}

/// Run one refresh cycle unless one is already in flight.
///
/// Returns `true` if this call ran the cycle, `false` if the trigger was
/// dropped. Failures publish a truncated status message; the gate is
/// released on every path.
pub async fn try_refresh(ctx: &RefreshContext) -> bool {
    if !ctx.gate.try_acquire() {
        tracing::info!("Refresh already in progress, trigger dropped");
        return false;
    }
    let _guard = GateGuard(&ctx.gate);

    set_status(ctx, "Refreshing…").await;
    tracing::info!("Refresh started");

    match run_cycle(ctx).await {
        Ok(outcome) => {
            let key_note = if outcome.no_key { " · no-key mode" } else { "" };
            let status = format!(
                "Updated {} · {} items{}",
                Local::now().format("%H:%M"),
                outcome.total_items,
                key_note,
            );
            set_status(ctx, &status).await;
            tracing::info!(total_items = outcome.total_items, "Refresh complete");
        }
        Err(e) => {
            tracing::error!("Refresh failed: {}", e);
            let message = truncate_chars(&e.to_string(), FAILURE_MESSAGE_MAX_CHARS);
            set_status(ctx, &format!("Refresh failed – {}", message)).await;
        }
    }

    true
}

/// Collect, summarize, rescore
async fn run_cycle(ctx: &RefreshContext) -> Result<CycleOutcome> {
    let candidates = ctx
        .collector
        .collect(&ctx.config.feeds, ctx.config.max_item_age_days)
        .await?;
    let new = insert_candidates(&ctx.pool, &candidates).await?;
    tracing::info!(fetched = candidates.len(), new, "Collection complete");

    // Key resolution happens fresh each cycle so a key saved through the
    // settings endpoint takes effect without a restart
    let (api_key, _source) = resolve_llm_api_key(&ctx.pool).await?;

    let batch = db::items::unscored_batch(&ctx.pool, ctx.config.batch_limit).await?;
    if !batch.is_empty() {
        let outcomes = ctx.summarizer.summarize(&batch, api_key.as_deref()).await?;
        for (item, outcome) in batch.iter().zip(outcomes.iter()) {
            db::items::apply_summary(&ctx.pool, item.id, outcome).await?;
        }
        tracing::info!(count = batch.len(), "Summarization complete");
    }

    ranking::recompute_all(&ctx.pool).await?;

    let total_items = db::items::count_items(&ctx.pool).await?;
    Ok(CycleOutcome {
        total_items,
        no_key: api_key.is_none(),
    })
}

async fn insert_candidates(pool: &SqlitePool, candidates: &[FeedItem]) -> Result<usize> {
    let mut new = 0;
    for candidate in candidates {
        if db::items::insert_candidate(pool, candidate).await? {
            new += 1;
        }
    }
    Ok(new)
}

async fn set_status(ctx: &RefreshContext, text: &str) {
    *ctx.status.write().await = text.to_string();
}

/// Spawn the periodic refresh task.
///
/// The interval's first tick fires immediately, which doubles as the
/// startup refresh.
pub fn spawn_scheduler(ctx: RefreshContext) {
    tokio::spawn(async move {
        let period = std::time::Duration::from_secs(ctx.config.refresh_interval_secs);
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            try_refresh(&ctx).await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_allows_one_acquire_at_a_time() {
        let gate = RefreshGate::new();

        assert!(gate.try_acquire());
        assert!(gate.is_refreshing());
        assert!(!gate.try_acquire());

        gate.release();
        assert!(!gate.is_refreshing());
        assert!(gate.try_acquire());
    }

    #[test]
    fn guard_releases_on_drop() {
        let gate = RefreshGate::new();
        assert!(gate.try_acquire());

        {
            let _guard = GateGuard(&gate);
        }

        assert!(!gate.is_refreshing());
        assert!(gate.try_acquire());
    }
}
