//! Concurrent retrieval across all configured feed endpoints.

use futures::future::join_all;
use tokio::time::Duration;
use tracing::{debug, info, warn};

use super::client::{create_http_client, fetch_endpoint};
use super::parser::parse_feed;
use super::types::{FeedFailure, FetchOutcome, FetchReport};
use super::util::{decode_bytes, decompress_body, is_valid_url};
use crate::config::CurateConfig;
use crate::item::CanonicalItem;
use crate::TARGET_WEB_REQUEST;

pub struct FeedFetcher {
    client: reqwest::Client,
    request_timeout: Duration,
}

impl FeedFetcher {
    pub fn new(config: &CurateConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: create_http_client()?,
            request_timeout: config.request_timeout,
        })
    }

    /// Retrieves every endpoint concurrently, one bounded task each, and
    /// assembles the batch only after all tasks have settled. A failing
    /// endpoint is logged and excluded; it never takes its siblings down.
    pub async fn fetch_all(&self, endpoints: &[String]) -> FetchReport {
        let tasks = endpoints
            .iter()
            .filter(|url| {
                if url.trim().is_empty() {
                    debug!(target: TARGET_WEB_REQUEST, "Skipping empty feed URL");
                    return false;
                }
                true
            })
            .map(|url| async move {
                match self.fetch_one(url).await {
                    Ok(items) => FetchOutcome::Fetched {
                        endpoint: url.clone(),
                        items,
                    },
                    Err(err) => FetchOutcome::Failed {
                        endpoint: url.clone(),
                        error: err.to_string(),
                    },
                }
            });

        let outcomes = join_all(tasks).await;
        let report = collect_outcomes(outcomes);
        info!(
            target: TARGET_WEB_REQUEST,
            "Fetched {} items from {} endpoints ({} failed)",
            report.items.len(),
            endpoints.len(),
            report.failures.len()
        );
        report
    }

    async fn fetch_one(&self, url: &str) -> anyhow::Result<Vec<CanonicalItem>> {
        if !is_valid_url(url) {
            return Err(anyhow::anyhow!("invalid feed URL"));
        }

        let payload = fetch_endpoint(&self.client, url, self.request_timeout).await?;
        let body = decompress_body(&payload.body, payload.content_encoding.as_deref(), url);
        let text = decode_bytes(&body, payload.content_type.as_deref());
        let items = parse_feed(&text, payload.content_type.as_deref(), url)?;

        debug!(
            target: TARGET_WEB_REQUEST,
            "Parsed {} items from {}",
            items.len(),
            url
        );
        Ok(items)
    }
}

/// Folds settled per-endpoint outcomes into one report. Runs strictly
/// after the join: no accumulator is ever written concurrently.
fn collect_outcomes(outcomes: Vec<FetchOutcome>) -> FetchReport {
    let mut report = FetchReport::default();
    for outcome in outcomes {
        match outcome {
            FetchOutcome::Fetched { endpoint, items } => {
                debug!(
                    target: TARGET_WEB_REQUEST,
                    "Endpoint {} contributed {} items",
                    endpoint,
                    items.len()
                );
                report.items.extend(items);
            }
            FetchOutcome::Failed { endpoint, error } => {
                warn!(
                    target: TARGET_WEB_REQUEST,
                    "Feed endpoint {} failed: {}", endpoint, error
                );
                report.failures.push(FeedFailure { endpoint, error });
            }
        }
    }
    report
}
