//! Data models for sift-fd (feed digest service)

pub mod item;

pub use item::{FeedItem, Item, RankedItem, SummaryOutcome};
