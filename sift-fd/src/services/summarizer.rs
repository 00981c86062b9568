//! Item summarization
//!
//! The production summarizer calls an OpenAI-compatible chat-completions
//! endpoint once per item and clamps every field at the boundary. Without a
//! credential, or when a call fails, it falls back to keyword matching so a
//! batch always produces one outcome per item. The credential is never
//! logged.

use async_trait::async_trait;
use serde::Deserialize;
use sift_common::text::truncate_chars;
use sift_common::{Error, Result};

use crate::config::SiftConfig;
use crate::models::{Item, SummaryOutcome};

const LLM_TIMEOUT_SECS: u64 = 30;
const SUMMARY_MAX_CHARS: usize = 500;
const RATIONALE_MAX_CHARS: usize = 300;
const FALLBACK_SUMMARY_MAX_CHARS: usize = 200;
const MAX_TAGS: usize = 6;

/// Produces curation outcomes for batches of items
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize a batch. Returns exactly one outcome per input item, in
    /// input order.
    async fn summarize(
        &self,
        items: &[Item],
        api_key: Option<&str>,
    ) -> Result<Vec<SummaryOutcome>>;
}

/// Production summarizer: chat-completions endpoint with keyword fallback
pub struct LlmSummarizer {
    http_client: reqwest::Client,
    topic: String,
    keywords: Vec<String>,
    api_url: String,
    model: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

/// Wire shape of the model's JSON reply, before boundary clamping
#[derive(Deserialize)]
struct RawOutcome {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    why_it_matters: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default = "default_relevance")]
    relevance_score: i64,
}

fn default_relevance() -> i64 {
    50
}

impl LlmSummarizer {
    pub fn new(config: &SiftConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(LLM_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Collaborator(format!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            http_client,
            topic: config.topic.clone(),
            keywords: config.keywords.clone(),
            api_url: config.llm_api_url.clone(),
            model: config.llm_model.clone(),
        })
    }

    fn build_prompt(&self, item: &Item) -> String {
        let snippet = if item.snippet.is_empty() {
            "N/A".to_string()
        } else {
            truncate_chars(&item.snippet, 400)
        };

        format!(
            "You are a content curator for the topic: \"{}\".\n\
             Keywords of interest: {}\n\n\
             Given this article:\n\
             Title: {}\n\
             Source: {}\n\
             Snippet: {}\n\n\
             Respond with ONLY valid JSON (no markdown fences):\n\
             {{\n\
               \"summary\": \"1-2 sentence summary\",\n\
               \"why_it_matters\": \"1 sentence on relevance to the topic\",\n\
               \"tags\": [\"tag1\", \"tag2\", \"tag3\"],\n\
               \"relevance_score\": 50\n\
             }}",
            self.topic,
            self.keywords.join(", "),
            item.title,
            item.source,
            snippet,
        )
    }

    async fn call_llm(&self, item: &Item, api_key: &str) -> Result<SummaryOutcome> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": self.build_prompt(item)}],
            "temperature": 0.3,
            "max_tokens": 300,
        });

        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Collaborator(format!("Summarizer request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| Error::Collaborator(format!("Summarizer returned {}", e)))?;

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Collaborator(format!("Summarizer response unreadable: {}", e)))?;

        let content = payload
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| Error::Collaborator("Summarizer response had no choices".to_string()))?;

        let raw: RawOutcome = serde_json::from_str(strip_fences(&content))
            .map_err(|e| Error::Collaborator(format!("Summarizer returned invalid JSON: {}", e)))?;

        Ok(clamp_outcome(raw))
    }

    /// Keyword-only outcome used when no credential is set or a call fails
    fn keyword_fallback(&self, item: &Item, rationale: &str) -> SummaryOutcome {
        let text = format!("{} {}", item.title, item.snippet).to_lowercase();
        let matched: Vec<&String> = self
            .keywords
            .iter()
            .filter(|kw| text.contains(&kw.to_lowercase()))
            .collect();

        let relevance = (10 + 15 * matched.len() as i64).min(100);
        let tags = matched
            .into_iter()
            .take(MAX_TAGS)
            .cloned()
            .collect();
        let summary = if item.snippet.is_empty() {
            "No summary available.".to_string()
        } else {
            truncate_chars(&item.snippet, FALLBACK_SUMMARY_MAX_CHARS)
        };

        SummaryOutcome {
            summary,
            rationale: rationale.to_string(),
            tags,
            relevance,
        }
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(
        &self,
        items: &[Item],
        api_key: Option<&str>,
    ) -> Result<Vec<SummaryOutcome>> {
        let key = match api_key {
            Some(key) => key,
            None => {
                tracing::info!("No LLM API key, using keyword-only fallback");
                return Ok(items
                    .iter()
                    .map(|item| {
                        self.keyword_fallback(
                            item,
                            "Matched by keyword relevance (no LLM key set).",
                        )
                    })
                    .collect());
            }
        };

        let mut outcomes = Vec::with_capacity(items.len());
        for item in items {
            match self.call_llm(item, key).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    tracing::warn!(item_id = item.id, "LLM call failed: {}", e);
                    outcomes
                        .push(self.keyword_fallback(item, "Summary unavailable (LLM error)."));
                }
            }
        }

        Ok(outcomes)
    }
}

/// Strip optional markdown code fences around a JSON reply
fn strip_fences(content: &str) -> &str {
    let mut text = content.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // First fence line may carry a language hint
        text = match rest.split_once('\n') {
            Some((_, body)) => body,
            None => rest,
        };
        text = text.trim_end();
        if let Some(body) = text.strip_suffix("```") {
            text = body;
        }
        text = text.trim();
    }
    text
}

/// Apply the boundary clamps to a raw model reply
fn clamp_outcome(raw: RawOutcome) -> SummaryOutcome {
    SummaryOutcome {
        summary: truncate_chars(&raw.summary, SUMMARY_MAX_CHARS),
        rationale: truncate_chars(&raw.why_it_matters, RATIONALE_MAX_CHARS),
        tags: raw.tags.into_iter().take(MAX_TAGS).collect(),
        relevance: raw.relevance_score.clamp(0, 100),
    }
}
