//! sift-fd library interface
//!
//! Exposes the application state, router and internal modules for
//! integration testing.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod ranking;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use crate::services::RefreshContext;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Refresh pipeline context: pool, config, collaborators, single-flight
    /// gate and the status line
    pub refresh: RefreshContext,
    /// Serializes feedback write + rescore pairs against each other
    pub vote_lock: Arc<Mutex<()>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(refresh: RefreshContext) -> Self {
        Self {
            refresh,
            vote_lock: Arc::new(Mutex::new(())),
            startup_time: Utc::now(),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.refresh.pool
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::digest_routes())
        .merge(api::feedback_routes())
        .merge(api::refresh_routes())
        .merge(api::status_routes())
        .merge(api::settings_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
