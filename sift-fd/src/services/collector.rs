//! RSS/Atom feed collection
//!
//! Fetches configured feeds over HTTP, parses them, strips HTML from entry
//! summaries and applies the max-age cutoff. A failing feed never aborts the
//! pass; it is logged and skipped.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sift_common::text::{collapse_whitespace, truncate_chars};
use sift_common::{Error, Result};

use crate::config::FeedConfig;
use crate::models::FeedItem;

const USER_AGENT: &str = concat!("sift-fd/", env!("CARGO_PKG_VERSION"));
const FEED_FETCH_TIMEOUT_SECS: u64 = 20;
/// Snippet length cap applied at collection time
const SNIPPET_MAX_CHARS: usize = 500;

/// Source of candidate items
#[async_trait]
pub trait Collector: Send + Sync {
    /// Collect candidate items from the configured feeds, applying the
    /// max-age cutoff. Per-feed failures are swallowed and logged.
    async fn collect(&self, feeds: &[FeedConfig], max_age_days: i64) -> Result<Vec<FeedItem>>;
}

/// Production collector backed by HTTP + feed parsing
pub struct RssCollector {
    http_client: reqwest::Client,
}

impl RssCollector {
    pub fn new() -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(FEED_FETCH_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Collaborator(format!("HTTP client build failed: {}", e)))?;

        Ok(Self { http_client })
    }

    async fn fetch_feed(
        &self,
        feed: &FeedConfig,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<FeedItem>> {
        let bytes = self
            .http_client
            .get(&feed.url)
            .send()
            .await
            .map_err(|e| Error::Collaborator(format!("Fetch failed: {}", e)))?
            .error_for_status()
            .map_err(|e| Error::Collaborator(format!("Fetch failed: {}", e)))?
            .bytes()
            .await
            .map_err(|e| Error::Collaborator(format!("Read body failed: {}", e)))?;

        let parsed = feed_rs::parser::parse(&bytes[..])
            .map_err(|e| Error::Collaborator(format!("Feed parse failed: {}", e)))?;

        Ok(feed_to_items(parsed, &feed.name, cutoff))
    }
}

#[async_trait]
impl Collector for RssCollector {
    async fn collect(&self, feeds: &[FeedConfig], max_age_days: i64) -> Result<Vec<FeedItem>> {
        let cutoff = Utc::now() - Duration::days(max_age_days);
        let mut items = Vec::new();

        for feed in feeds {
            match self.fetch_feed(feed, cutoff).await {
                Ok(mut fetched) => {
                    tracing::debug!(feed = %feed.name, count = fetched.len(), "Feed fetched");
                    items.append(&mut fetched);
                }
                Err(e) => {
                    tracing::warn!(feed = %feed.name, "Failed to fetch feed: {}", e);
                }
            }
        }

        Ok(items)
    }
}

/// Convert a parsed feed into candidate items.
///
/// Entries older than the cutoff are dropped; entries without a parseable
/// date are kept and stamped with the current time. Entries missing a title
/// or link are skipped.
fn feed_to_items(
    feed: feed_rs::model::Feed,
    source: &str,
    cutoff: DateTime<Utc>,
) -> Vec<FeedItem> {
    let mut items = Vec::new();

    for entry in feed.entries {
        let published = entry.published.or(entry.updated);
        if let Some(date) = published {
            if date < cutoff {
                continue;
            }
        }

        let title = entry
            .title
            .as_ref()
            .map(|t| t.content.trim().to_string())
            .unwrap_or_default();
        let url = entry
            .links
            .first()
            .map(|l| l.href.trim().to_string())
            .unwrap_or_default();
        if title.is_empty() || url.is_empty() {
            continue;
        }

        let raw_snippet = entry
            .summary
            .as_ref()
            .map(|t| t.content.clone())
            .or_else(|| entry.content.as_ref().and_then(|c| c.body.clone()))
            .unwrap_or_default();
        let snippet = truncate_chars(
            collapse_whitespace(&nanohtml2text::html2text(&raw_snippet)).trim(),
            SNIPPET_MAX_CHARS,
        );

        items.push(FeedItem {
            title,
            url,
            source: source.to_string(),
            published_at: published.unwrap_or_else(Utc::now),
            snippet,
        });
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> feed_rs::model::Feed {
        feed_rs::parser::parse(xml.as_bytes()).unwrap()
    }

    fn old_cutoff() -> DateTime<Utc> {
        Utc::now() - Duration::days(7)
    }

    #[test]
    fn entries_missing_title_or_link_are_skipped() {
        let feed = parse(
            r#"<rss version="2.0"><channel><title>F</title>
            <item><title>Has Title Only</title></item>
            <item><link>https://e.com/link-only</link></item>
            <item><title>Complete</title><link>https://e.com/ok</link></item>
            </channel></rss>"#,
        );

        let items = feed_to_items(feed, "F", old_cutoff());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Complete");
        assert_eq!(items[0].url, "https://e.com/ok");
    }

    #[test]
    fn entries_older_than_cutoff_are_dropped() {
        let feed = parse(
            r#"<rss version="2.0"><channel><title>F</title>
            <item><title>Ancient</title><link>https://e.com/old</link>
                <pubDate>Mon, 01 Jan 2001 00:00:00 GMT</pubDate></item>
            </channel></rss>"#,
        );

        let items = feed_to_items(feed, "F", old_cutoff());
        assert!(items.is_empty());
    }

    #[test]
    fn undated_entries_are_kept_and_stamped_now() {
        let feed = parse(
            r#"<rss version="2.0"><channel><title>F</title>
            <item><title>Undated</title><link>https://e.com/undated</link></item>
            </channel></rss>"#,
        );

        let before = Utc::now();
        let items = feed_to_items(feed, "F", old_cutoff());
        assert_eq!(items.len(), 1);
        assert!(items[0].published_at >= before);
    }

    #[test]
    fn snippet_html_is_stripped_and_whitespace_collapsed() {
        let feed = parse(
            r#"<rss version="2.0"><channel><title>F</title>
            <item><title>T</title><link>https://e.com/a</link>
                <description>&lt;p&gt;Hello   &lt;b&gt;world&lt;/b&gt;&lt;/p&gt;</description></item>
            </channel></rss>"#,
        );

        let items = feed_to_items(feed, "F", old_cutoff());
        assert_eq!(items[0].snippet, "Hello world");
    }

    #[test]
    fn long_snippets_are_capped() {
        let long_text = "word ".repeat(300);
        let xml = format!(
            r#"<rss version="2.0"><channel><title>F</title>
            <item><title>T</title><link>https://e.com/a</link>
                <description>{}</description></item>
            </channel></rss>"#,
            long_text
        );

        let items = feed_to_items(parse(&xml), "F", old_cutoff());
        assert!(items[0].snippet.chars().count() <= SNIPPET_MAX_CHARS);
    }

    #[test]
    fn source_name_comes_from_feed_config() {
        let feed = parse(
            r#"<rss version="2.0"><channel><title>Feed Internal Title</title>
            <item><title>T</title><link>https://e.com/a</link></item>
            </channel></rss>"#,
        );

        let items = feed_to_items(feed, "Display Name", old_cutoff());
        assert_eq!(items[0].source, "Display Name");
    }
}
