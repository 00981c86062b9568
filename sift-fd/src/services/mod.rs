//! External collaborators and refresh orchestration
//!
//! The collector and summarizer sit behind traits so the orchestrator can be
//! exercised with fakes.

pub mod collector;
pub mod refresh;
pub mod summarizer;

pub use collector::{Collector, RssCollector};
pub use refresh::{RefreshContext, RefreshGate};
pub use summarizer::{LlmSummarizer, Summarizer};
