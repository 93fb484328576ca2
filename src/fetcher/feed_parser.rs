//! Feed response parsing
//!
//! The feed answers a window query with a document carrying three header
//! fields (`noOfPosts`, `lastPost`, `lastPostMs`) and the post list. The
//! position fields are required whenever `noOfPosts > 0`; without them the
//! watermark cannot be advanced safely, so their absence is a parse error
//! rather than something to paper over.

use crate::{Batch, LastPostMarker, Post};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{FetcherError, FetcherResult};

/// Wire model of a feed response
#[derive(Debug, Deserialize)]
struct FeedResponse {
    #[serde(rename = "noOfPosts")]
    no_of_posts: u64,
    #[serde(rename = "lastPost", default)]
    last_post: Option<String>,
    #[serde(rename = "lastPostMs", default)]
    last_post_ms: Option<f64>,
    #[serde(default)]
    posts: Vec<Post>,
}

/// Parse a raw feed response body into a [`Batch`].
///
/// The raw body is retained verbatim in the batch so sinks can persist the
/// payload exactly as received.
pub fn parse_batch(raw: &str) -> FetcherResult<Batch> {
    let response: FeedResponse = serde_json::from_str(raw)
        .map_err(|e| FetcherError::ParseError(format!("malformed feed response: {e}")))?;

    let last_post = if response.no_of_posts > 0 {
        let ts_raw = response.last_post.ok_or_else(|| {
            FetcherError::InvalidResponse(format!(
                "noOfPosts is {} but lastPost is missing",
                response.no_of_posts
            ))
        })?;
        let sub_ms = response.last_post_ms.ok_or_else(|| {
            FetcherError::InvalidResponse(format!(
                "noOfPosts is {} but lastPostMs is missing",
                response.no_of_posts
            ))
        })?;
        if !sub_ms.is_finite() || sub_ms < 0.0 {
            return Err(FetcherError::InvalidResponse(format!(
                "lastPostMs out of range: {sub_ms}"
            )));
        }
        Some(LastPostMarker {
            timestamp: parse_last_post_timestamp(&ts_raw)?,
            sub_ms,
        })
    } else {
        None
    };

    Ok(Batch {
        count: response.no_of_posts,
        posts: response.posts,
        last_post,
        raw: raw.to_string(),
    })
}

/// Parse the `lastPost` header as a UTC instant.
fn parse_last_post_timestamp(raw: &str) -> FetcherResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| FetcherError::ParseError(format!("bad lastPost timestamp '{raw}': {e}")))
}
