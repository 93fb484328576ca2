//! Feed port: data fetching from the remote live feed service

use crate::{Batch, QueryWindow};
use async_trait::async_trait;

pub mod feed_http;
pub mod feed_parser;

pub use feed_http::HttpFeedClient;

/// Fetcher errors
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// Network error (timeout, connection refused, DNS)
    #[error("network error: {0}")]
    NetworkError(String),

    /// Non-success HTTP status from the feed endpoint
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Malformed feed response
    #[error("parse error: {0}")]
    ParseError(String),

    /// Response that is well-formed but violates the feed contract
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;

/// Port to the remote feed service.
///
/// Semantics: return up to `window.max_posts` posts with timestamp in
/// `[window.from, window.to)`, ordered ascending, plus the exact match count
/// and the last delivered post's timestamp/sub-millisecond offset.
///
/// All failures are transient from the poll loop's perspective; the
/// controller retries at a fixed cadence.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetch one batch for the given window.
    async fn fetch(&self, window: &QueryWindow) -> FetcherResult<Batch>;
}
