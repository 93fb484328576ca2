//! # Live Feed Poller Library
//!
//! An incremental-polling client for live feed services that deliver
//! time-ordered posts through a count-and-timespan-bounded retrieval API.
//! The poller repeatedly asks for "up to N posts in `[from, to)`" and
//! advances a durable watermark so that no post is ever fetched twice nor
//! permanently skipped, across process restarts included.
//!
//! ## Features
//!
//! - **Watermark advancement**: pure, testable cursor arithmetic that steps
//!   strictly past the last delivered post, honoring the feed's
//!   sub-millisecond timestamp offsets
//! - **Durable resume**: the cursor is persisted atomically after every
//!   successful fetch and reloaded on startup
//! - **Adaptive pacing**: the long-run polling cadence tracks a target
//!   interval regardless of request latency, with immediate re-query when a
//!   full page suggests more data is pending
//! - **Two modes**: indefinite live tailing and one-shot historical backfill
//!   over an explicit range
//!
//! ## Quick Start
//!
//! ```no_run
//! use livefeed_poller::fetcher::HttpFeedClient;
//! use livefeed_poller::cursor::FileCursorStore;
//! use livefeed_poller::poller::{PollConfig, PollController};
//! use livefeed_poller::shutdown::ShutdownHandle;
//! use livefeed_poller::sink::CountingSink;
//!
//! # async fn example() {
//! let fetcher = HttpFeedClient::new("https://feed.example.com", "api-key");
//! let store = FileCursorStore::new("nextfrom_timestamp.txt");
//! let shutdown = ShutdownHandle::shared();
//!
//! let controller = PollController::continuous(
//!     Box::new(fetcher),
//!     Box::new(CountingSink::new()),
//!     Box::new(store),
//!     PollConfig::continuous_defaults(),
//!     shutdown,
//! );
//! let summary = controller.run().await;
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`fetcher`] - Feed port: HTTP client and response parsing
//! - [`poller`] - Watermark advancement and the poll loop controller
//! - [`cursor`] - Durable cursor persistence
//! - [`sink`] - Batch consumers (counting, per-window files)
//! - [`cli`] - Command implementations for `tail` and `backfill`
//! - [`shutdown`] - Cooperative cancellation handle

#![warn(missing_docs)]
#![warn(clippy::all)]

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// CLI command implementations
pub mod cli;

/// Durable cursor persistence
pub mod cursor;

/// Feed port: HTTP client and response parsing
pub mod fetcher;

/// Observability metrics
pub mod metrics;

/// Watermark advancement and poll loop orchestration
pub mod poller;

/// Cooperative cancellation shared between the poll loop and signal listeners
pub mod shutdown;

/// Batch consumers
pub mod sink;

/// Timestamp format accepted on the command line and used in window file
/// names. Sortable, second precision, always UTC (`2024-01-01 00:00:00Z`).
pub const FEED_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%SZ";

/// Parse a timestamp in [`FEED_TIMESTAMP_FORMAT`] as a UTC instant.
pub fn parse_feed_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    chrono::NaiveDateTime::parse_from_str(raw.trim(), FEED_TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
}

/// Format a UTC instant in [`FEED_TIMESTAMP_FORMAT`].
pub fn format_feed_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(FEED_TIMESTAMP_FORMAT).to_string()
}

/// Format a UTC instant as a round-trippable RFC 3339 string with nanosecond
/// precision. This is the representation persisted to the cursor file.
pub fn format_cursor_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// A single post delivered by the feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    /// Feed-assigned post identifier
    #[serde(default)]
    pub id: Option<String>,
    /// Canonical URL of the post
    pub url: String,
    /// Publication instant, UTC
    #[serde(default)]
    pub published: Option<DateTime<Utc>>,
}

/// Position of the last post in a non-empty batch.
///
/// The feed reports post times at millisecond resolution plus a fractional
/// sub-millisecond offset, because the true event ordering is finer than the
/// coarse timestamp. Both parts are needed to compute the next window start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LastPostMarker {
    /// Coarse timestamp of the last delivered post, UTC
    pub timestamp: DateTime<Utc>,
    /// Fractional offset past `timestamp`, in milliseconds
    pub sub_ms: f64,
}

/// One result batch from the feed
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Exact number of posts matched by the query, as reported by the feed
    pub count: u64,
    /// The delivered posts, ordered by timestamp ascending (feed contract)
    pub posts: Vec<Post>,
    /// Position of the last delivered post; present iff `count > 0`
    pub last_post: Option<LastPostMarker>,
    /// The serialized payload exactly as received
    pub raw: String,
}

impl Batch {
    /// An empty batch, as returned for a window containing no posts.
    pub fn empty(raw: impl Into<String>) -> Self {
        Self {
            count: 0,
            posts: Vec::new(),
            last_post: None,
            raw: raw.into(),
        }
    }
}

/// A bounded query window submitted to the feed: up to `max_posts` posts
/// with timestamp in `[from, to)`.
///
/// Callers must uphold `from < to`; a window violating that must never be
/// submitted to the feed port.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryWindow {
    /// Window start, inclusive, UTC
    pub from: DateTime<Utc>,
    /// Window end, exclusive, UTC
    pub to: DateTime<Utc>,
    /// Page cap for this request
    pub max_posts: u32,
}
