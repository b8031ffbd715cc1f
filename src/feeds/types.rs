//! Type definitions for the feeds module.

use serde::Deserialize;

use crate::item::CanonicalItem;

/// Result of one endpoint's retrieval task. Failures are data, not errors:
/// one endpoint can never abort its siblings.
#[derive(Debug)]
pub enum FetchOutcome {
    Fetched {
        endpoint: String,
        items: Vec<CanonicalItem>,
    },
    Failed {
        endpoint: String,
        error: String,
    },
}

/// A failed endpoint, kept for diagnostics.
#[derive(Debug, Clone)]
pub struct FeedFailure {
    pub endpoint: String,
    pub error: String,
}

/// The batch assembled after all retrieval tasks complete.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub items: Vec<CanonicalItem>,
    pub failures: Vec<FeedFailure>,
}

/// JSON Feed document structure for parsing.
#[derive(Debug, Deserialize)]
pub struct JsonFeed {
    pub title: Option<String>,
    #[serde(default)]
    pub items: Vec<JsonFeedItem>,
}

/// JSON Feed item structure.
#[derive(Debug, Deserialize)]
pub struct JsonFeedItem {
    pub id: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub content_text: Option<String>,
    pub summary: Option<String>,
    pub date_published: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

// Constants
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; chorus-feed-reader/0.1)";
