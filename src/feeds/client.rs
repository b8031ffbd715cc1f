//! HTTP client creation and request handling for feed endpoints.

use anyhow::{anyhow, Result};
use reqwest::{cookie::Jar, header};
use std::sync::Arc;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::types::USER_AGENT;
use crate::TARGET_WEB_REQUEST;

/// One endpoint's raw response: declared content type and encoding, plus
/// the undecoded body.
#[derive(Debug)]
pub struct RawPayload {
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
    pub body: Vec<u8>,
}

pub fn create_http_client() -> Result<reqwest::Client> {
    let cookie_store = Jar::default();
    reqwest::Client::builder()
        .cookie_store(true)
        .cookie_provider(Arc::new(cookie_store))
        .gzip(true)
        .redirect(reqwest::redirect::Policy::default())
        .build()
        .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))
}

/// Fetches one endpoint within the given timeout. Timeouts, transport
/// errors and non-success statuses all surface as plain errors for the
/// caller to contain.
pub async fn fetch_endpoint(
    client: &reqwest::Client,
    url: &str,
    request_timeout: Duration,
) -> Result<RawPayload> {
    debug!(target: TARGET_WEB_REQUEST, "Requesting {}", url);

    let response = timeout(
        request_timeout,
        client
            .get(url)
            .header(header::USER_AGENT, USER_AGENT)
            .header(
                header::ACCEPT,
                "application/feed+json, application/json, application/rss+xml, \
                 application/atom+xml, application/xml, text/xml, */*;q=0.9",
            )
            .send(),
    )
    .await
    .map_err(|_| anyhow!("request timed out after {:?}", request_timeout))?
    .map_err(|e| anyhow!("request failed: {}", e))?;

    if !response.status().is_success() {
        return Err(anyhow!("non-success status {}", response.status()));
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|s| s.to_lowercase());
    let content_encoding = response
        .headers()
        .get(header::CONTENT_ENCODING)
        .and_then(|value| value.to_str().ok())
        .map(|s| s.to_lowercase());

    let body = response
        .bytes()
        .await
        .map_err(|e| anyhow!("failed to read response body: {}", e))?
        .to_vec();

    Ok(RawPayload {
        content_type,
        content_encoding,
        body,
    })
}
