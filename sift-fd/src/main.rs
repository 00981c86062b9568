//! sift-fd - Feed Digest Service
//!
//! Collects RSS/Atom feeds on a schedule, scores items against a configured
//! topic (LLM-backed with a keyword fallback) and serves a ranked digest
//! over HTTP.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sift_fd::config::SiftConfig;
use sift_fd::services::refresh::{self, RefreshContext, RefreshGate};
use sift_fd::services::{LlmSummarizer, RssCollector};
use sift_fd::AppState;

#[derive(Parser, Debug)]
#[command(name = "sift-fd", version, about = "Adaptive topic digest service")]
struct Args {
    /// Root data folder (overrides SIFT_ROOT and the config file)
    #[arg(long)]
    root_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting sift-fd (feed digest) service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let root_folder =
        sift_common::config::resolve_root_folder(args.root_folder.as_deref(), "SIFT_ROOT", "sift");
    std::fs::create_dir_all(&root_folder)?;
    info!("Root folder: {}", root_folder.display());

    let config = Arc::new(SiftConfig::load(&root_folder)?);
    info!(
        topic = %config.topic,
        feeds = config.feeds.len(),
        "Configuration ready"
    );

    let db_path = root_folder.join("digest.db");
    info!("Database: {}", db_path.display());
    let pool = sift_fd::db::init_pool(&db_path).await?;

    let ctx = RefreshContext {
        pool,
        config: config.clone(),
        collector: Arc::new(RssCollector::new()?),
        summarizer: Arc::new(LlmSummarizer::new(&config)?),
        gate: Arc::new(RefreshGate::new()),
        status: Arc::new(RwLock::new(refresh::INITIAL_STATUS.to_string())),
    };

    // First tick fires immediately: the startup refresh
    refresh::spawn_scheduler(ctx.clone());

    let state = AppState::new(ctx);
    let app = sift_fd::build_router(state);

    let addr = format!("127.0.0.1:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    info!("Digest: http://{}/api/digest", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
