//! Feed parsing for RSS, Atom, and JSON Feed payloads.

use anyhow::{anyhow, Result};
use feed_rs::parser;
use std::collections::BTreeSet;
use std::io::Cursor;
use tracing::debug;

use super::types::{JsonFeed, JsonFeedItem};
use super::util::{cleanup_xml, parse_date, strip_html};
use crate::item::CanonicalItem;
use crate::TARGET_WEB_REQUEST;

/// Parses one payload into canonical items, preserving the order the feed
/// lists them in. JSON Feeds are detected by content type; everything else
/// goes through the XML parser, with one cleanup-and-retry pass for
/// malformed documents.
pub fn parse_feed(
    text: &str,
    content_type: Option<&str>,
    endpoint: &str,
) -> Result<Vec<CanonicalItem>> {
    if let Some(ct) = content_type {
        if ct.contains("json") {
            debug!(target: TARGET_WEB_REQUEST, "Processing as JSON feed: {}", endpoint);
            return parse_json_feed(text, endpoint);
        }
    }

    debug!(target: TARGET_WEB_REQUEST, "Processing as XML feed: {}", endpoint);
    match parser::parse(Cursor::new(text)) {
        Ok(feed) => Ok(convert_xml_feed(feed, endpoint)),
        Err(first_err) => {
            let cleaned = cleanup_xml(text);
            if cleaned.contains("<rss") || cleaned.contains("<feed") {
                match parser::parse(Cursor::new(cleaned.as_bytes())) {
                    Ok(feed) => Ok(convert_xml_feed(feed, endpoint)),
                    Err(second_err) => Err(anyhow!(
                        "feed unparsable even after cleanup: {}; {}",
                        first_err,
                        second_err
                    )),
                }
            } else {
                Err(anyhow!("content is not an RSS or Atom feed: {}", first_err))
            }
        }
    }
}

fn convert_xml_feed(feed: feed_rs::model::Feed, endpoint: &str) -> Vec<CanonicalItem> {
    let source_name = feed
        .title
        .map(|t| t.content)
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| endpoint_host(endpoint));

    feed.entries
        .into_iter()
        .filter_map(|entry| {
            let link = entry.links.first().map(|l| l.href.clone())?;
            let title = entry
                .title
                .map(|t| strip_html(&t.content))
                .unwrap_or_default();
            let description = entry
                .summary
                .map(|t| strip_html(&t.content))
                .or_else(|| {
                    entry
                        .content
                        .and_then(|c| c.body)
                        .map(|body| strip_html(&body))
                })
                .unwrap_or_default();
            let author = entry
                .authors
                .first()
                .map(|person| person.name.clone())
                .filter(|name| !name.trim().is_empty());
            let categories: BTreeSet<String> = entry
                .categories
                .into_iter()
                .map(|c| c.term)
                .filter(|term| !term.trim().is_empty())
                .collect();

            Some(CanonicalItem {
                title,
                description,
                link,
                source_name: source_name.clone(),
                published_at: entry.published.or(entry.updated),
                author,
                categories,
            })
        })
        .collect()
}

fn parse_json_feed(text: &str, endpoint: &str) -> Result<Vec<CanonicalItem>> {
    let feed: JsonFeed =
        serde_json::from_str(text).map_err(|e| anyhow!("JSON feed parsing error: {}", e))?;
    let source_name = feed
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| endpoint_host(endpoint));

    Ok(feed
        .items
        .into_iter()
        .filter_map(|item| convert_json_item(item, &source_name))
        .collect())
}

fn convert_json_item(item: JsonFeedItem, source_name: &str) -> Option<CanonicalItem> {
    let link = item.url.or(item.id)?;
    let description = item
        .content_text
        .or(item.summary)
        .map(|text| strip_html(&text))
        .unwrap_or_default();

    Some(CanonicalItem {
        title: item.title.unwrap_or_default(),
        description,
        link,
        source_name: source_name.to_string(),
        published_at: item.date_published.as_deref().and_then(parse_date),
        author: None,
        categories: item.tags.into_iter().collect(),
    })
}

fn endpoint_host(endpoint: &str) -> String {
    url::Url::parse(endpoint)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| "Unknown Source".to_string())
}
