//! Configuration for sift-fd
//!
//! Service settings come from `sift.toml` in the root folder, with compiled
//! defaults for anything absent. The summarizer credential is resolved
//! separately with env-over-store priority.

use serde::Deserialize;
use sift_common::{Error, Result};
use sqlx::SqlitePool;
use std::path::Path;

/// Environment variable consulted first for the summarizer credential
pub const LLM_KEY_ENV_VAR: &str = "SIFT_LLM_KEY";

/// A single RSS/Atom feed subscription
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedConfig {
    /// Display name, stored as the item's source
    pub name: String,
    pub url: String,
}

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiftConfig {
    /// Topic the digest curates for
    pub topic: String,
    /// Keywords used in summarizer prompts and the no-key fallback
    pub keywords: Vec<String>,
    pub feeds: Vec<FeedConfig>,
    /// HTTP listen port
    pub port: u16,
    pub refresh_interval_secs: u64,
    /// Max unscored items summarized per refresh cycle
    pub batch_limit: i64,
    /// Collection cutoff for entry age
    pub max_item_age_days: i64,
    /// Default digest size
    pub digest_limit: i64,
    pub llm_api_url: String,
    pub llm_model: String,
}

impl Default for SiftConfig {
    fn default() -> Self {
        Self {
            topic: "AI process + productivity systems".to_string(),
            keywords: [
                "scrum",
                "team structure",
                "engineering process",
                "shipping cadence",
                "planning",
                "execution",
                "LLM ops",
                "dev workflow",
                "productivity",
                "developer experience",
                "agile",
                "kanban",
                "CI/CD",
                "devops",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            feeds: vec![
                feed("Hacker News (Popular)", "https://hnrss.org/newest?points=100"),
                feed("Lobsters", "https://lobste.rs/rss"),
                feed("Simon Willison", "https://simonwillison.net/atom/everything/"),
                feed("The New Stack", "https://thenewstack.io/blog/feed/"),
                feed("GitHub Blog", "https://github.blog/feed/"),
                feed("Stack Overflow Blog", "https://stackoverflow.blog/feed/"),
                feed("Changelog", "https://changelog.com/feed"),
                feed("MIT Tech Review", "https://www.technologyreview.com/feed/"),
            ],
            port: 19847,
            refresh_interval_secs: 60 * 60,
            batch_limit: 30,
            max_item_age_days: 7,
            digest_limit: 15,
            llm_api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            llm_model: "gpt-4o-mini".to_string(),
        }
    }
}

fn feed(name: &str, url: &str) -> FeedConfig {
    FeedConfig {
        name: name.to_string(),
        url: url.to_string(),
    }
}

impl SiftConfig {
    /// Load `sift.toml` from the root folder, or compiled defaults if absent
    pub fn load(root_folder: &Path) -> Result<Self> {
        let path = root_folder.join("sift.toml");
        if !path.exists() {
            tracing::info!("No sift.toml found, using compiled defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
        tracing::info!("Configuration loaded from {}", path.display());
        Ok(config)
    }
}

/// Where a resolved credential came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Env,
    Store,
    Unset,
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::Env => "env",
            KeySource::Store => "store",
            KeySource::Unset => "none",
        }
    }
}

/// Resolve the summarizer credential: environment variable first, then the
/// settings table. Blank values are treated as unset. The value itself is
/// never logged.
pub async fn resolve_llm_api_key(pool: &SqlitePool) -> Result<(Option<String>, KeySource)> {
    if let Ok(key) = std::env::var(LLM_KEY_ENV_VAR) {
        if !key.trim().is_empty() {
            return Ok((Some(key), KeySource::Env));
        }
    }

    match crate::db::settings::get_llm_api_key(pool).await? {
        Some(key) if !key.trim().is_empty() => Ok((Some(key), KeySource::Store)),
        _ => Ok((None, KeySource::Unset)),
    }
}
