//! The canonical content item every pipeline stage operates on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A normalized text record produced by a feed adapter. Immutable once
/// parsed; all downstream stages borrow it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalItem {
    pub title: String,
    pub description: String,
    pub link: String,
    pub source_name: String,
    pub published_at: Option<DateTime<Utc>>,
    pub author: Option<String>,
    pub categories: BTreeSet<String>,
}

impl CanonicalItem {
    /// Title and description joined, the text every scoring and similarity
    /// computation runs over.
    pub fn raw_full_text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }

    /// Estimated read time of the description in whole minutes, never
    /// below one.
    pub fn read_time_minutes(&self, words_per_minute: u32) -> u32 {
        let words = self.description.split_whitespace().count() as u32;
        (words / words_per_minute.max(1)).max(1)
    }
}
