//! Feed retrieval module.
//!
//! This module handles the concurrent fetching, decoding, and parsing of
//! feed endpoints into canonical items.

mod client;
mod fetcher;
mod parser;
mod types;
mod util;

// Re-export the fetcher and per-endpoint outcome types
pub use self::fetcher::FeedFetcher;
pub use self::types::{FeedFailure, FetchOutcome, FetchReport};

// Re-export parsing and payload helpers
pub use self::parser::parse_feed;
pub use self::util::{decode_bytes, decompress_body, is_valid_url, parse_date, strip_html};
