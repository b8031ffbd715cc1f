//! Immutable pipeline configuration, constructed once at startup and passed
//! by reference into every component constructor.

use std::env;
use tokio::time::Duration;

use crate::clustering::DEFAULT_SIMILARITY_THRESHOLD;
use crate::sentiment::neural::NeuralConfig;
use crate::sentiment::BackendKind;

#[derive(Debug, Clone)]
pub struct CurateConfig {
    /// Feed endpoints polled by the fetcher.
    pub feeds: Vec<String>,
    /// Cosine similarity at or above which two items are considered the
    /// same story.
    pub similarity_threshold: f64,
    /// Default cap on the number of formatted clusters returned.
    pub max_items: usize,
    /// Per-endpoint retrieval timeout.
    pub request_timeout: Duration,
    /// Reading speed used for read-time estimates.
    pub words_per_minute: u32,
    /// Preferred sentiment backend; unavailable backends fall back down
    /// the chain at initialization.
    pub sentiment_backend: BackendKind,
    pub neural: NeuralConfig,
}

impl Default for CurateConfig {
    fn default() -> Self {
        Self {
            feeds: vec![
                "https://www.technologyreview.com/feed/".to_string(),
                "https://www.wired.com/feed/tag/ai/latest/rss".to_string(),
                "https://techcrunch.com/feed/".to_string(),
                "https://huggingface.co/blog/feed.xml".to_string(),
                "https://stackoverflow.blog/feed/".to_string(),
                "https://www.theguardian.com/technology/artificialintelligenceai/rss"
                    .to_string(),
            ],
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_items: 10,
            request_timeout: Duration::from_secs(30),
            words_per_minute: 200,
            sentiment_backend: BackendKind::Valence,
            neural: NeuralConfig::default(),
        }
    }
}

impl CurateConfig {
    /// Builds a configuration from environment variables, keeping the
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        let feeds = get_env_var_as_vec("CHORUS_FEEDS", ';');
        if !feeds.is_empty() {
            config.feeds = feeds;
        }

        if let Ok(threshold) = env::var("CHORUS_SIMILARITY_THRESHOLD") {
            if let Ok(value) = threshold.parse::<f64>() {
                if value > 0.0 && value < 1.0 {
                    config.similarity_threshold = value;
                }
            }
        }

        if let Ok(max_items) = env::var("CHORUS_MAX_ITEMS") {
            if let Ok(value) = max_items.parse::<usize>() {
                config.max_items = value;
            }
        }

        if let Ok(backend) = env::var("CHORUS_SENTIMENT_BACKEND") {
            match backend.to_lowercase().as_str() {
                "basic" => config.sentiment_backend = BackendKind::Basic,
                "valence" => config.sentiment_backend = BackendKind::Valence,
                "neural" => config.sentiment_backend = BackendKind::Neural,
                _ => {}
            }
        }

        config
    }
}

/// Retrieves an environment variable and splits it into a vector of strings
/// based on a delimiter, dropping empty entries.
fn get_env_var_as_vec(var: &str, delimiter: char) -> Vec<String> {
    env::var(var)
        .unwrap_or_default()
        .split(delimiter)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
