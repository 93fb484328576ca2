//! Backfill command: one-shot historical drain of an explicit range

use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use crate::fetcher::HttpFeedClient;
use crate::poller::{PollConfig, PollController};
use crate::shutdown::SharedShutdown;
use crate::sink::WindowFileSink;

use super::{parse_cli_timestamp, CliError};

/// Arguments for the backfill command
#[derive(Parser, Debug)]
pub struct BackfillArgs {
    /// Feed API key
    pub api_key: String,

    /// Range start, inclusive (e.g. "2024-01-01 00:00:00Z")
    #[arg(value_parser = parse_cli_timestamp)]
    pub from: DateTime<Utc>,

    /// Range end, exclusive (same format)
    #[arg(value_parser = parse_cli_timestamp)]
    pub to: DateTime<Utc>,

    /// Maximum number of posts per request
    #[arg(default_value_t = crate::poller::config::MAX_POSTS_BOUNDED,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub max_posts: u32,

    /// Feed endpoint base URL
    #[arg(long, env = "LIVEFEED_BASE_URL")]
    pub base_url: String,

    /// Directory for per-window payload files
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,
}

impl BackfillArgs {
    /// Execute the backfill: drain `[from, to)` and write one payload file
    /// per non-empty window.
    pub async fn execute(&self, shutdown: SharedShutdown) -> Result<(), CliError> {
        if self.from >= self.to {
            return Err(CliError::InvalidArgument(format!(
                "from ({}) must be strictly before to ({})",
                crate::format_feed_timestamp(self.from),
                crate::format_feed_timestamp(self.to),
            )));
        }

        info!(
            from = %self.from,
            to = %self.to,
            max_posts = self.max_posts,
            output_dir = %self.output_dir.display(),
            "Starting backfill"
        );

        let fetcher = HttpFeedClient::new(&self.base_url, &self.api_key);
        let sink = WindowFileSink::new(&self.output_dir);
        let config = PollConfig::bounded_defaults().with_max_posts(self.max_posts);

        let controller = PollController::bounded(
            Box::new(fetcher),
            Box::new(sink),
            self.from,
            self.to,
            config,
            shutdown,
        );

        let summary = controller.run().await;
        info!(
            posts = summary.posts,
            windows = summary.windows,
            reason = ?summary.stopped,
            "Backfill finished"
        );
        Ok(())
    }
}
