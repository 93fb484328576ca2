//! HTTP feed client
//!
//! Thin transport over the feed's windowed retrieval endpoint. Retry policy
//! lives in the poll loop controller, not here: every failure is surfaced
//! immediately so the loop's fixed-cadence retry stays the single authority
//! on when the feed is contacted again.

use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::{format_cursor_timestamp, Batch, QueryWindow};

use super::feed_parser::parse_batch;
use super::{FeedFetcher, FetcherError, FetcherResult};

/// Endpoint path for windowed post retrieval
const POSTS_ENDPOINT: &str = "/posts";

/// Per-request timeout. Generous because large pages can be slow to
/// assemble server-side, but bounded so a hung request cannot stall the
/// pacing loop forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP implementation of [`FeedFetcher`].
pub struct HttpFeedClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpFeedClient {
    /// Create a new client for the given feed endpoint.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn query_params(&self, window: &QueryWindow) -> [(&'static str, String); 4] {
        [
            ("apiKey", self.api_key.clone()),
            ("from", format_cursor_timestamp(window.from)),
            ("to", format_cursor_timestamp(window.to)),
            ("maxPosts", window.max_posts.to_string()),
        ]
    }
}

#[async_trait::async_trait]
impl FeedFetcher for HttpFeedClient {
    async fn fetch(&self, window: &QueryWindow) -> FetcherResult<Batch> {
        let url = format!("{}{}", self.base_url, POSTS_ENDPOINT);
        let params = self.query_params(window);

        debug!(
            url = %url,
            from = %window.from,
            to = %window.to,
            max_posts = window.max_posts,
            "Requesting feed window"
        );

        let response = self
            .client
            .get(&url)
            .query(&params)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| FetcherError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(FetcherError::HttpError(format!("{status}: {body}")));
        }

        let raw = response
            .text()
            .await
            .map_err(|e| FetcherError::NetworkError(format!("reading response body: {e}")))?;

        parse_batch(&raw)
    }
}
