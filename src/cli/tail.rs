//! Tail command: indefinite live tailing with durable resume

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

use crate::cursor::FileCursorStore;
use crate::fetcher::HttpFeedClient;
use crate::metrics;
use crate::poller::{PollConfig, PollController};
use crate::shutdown::SharedShutdown;
use crate::sink::CountingSink;

use super::CliError;

/// Arguments for the tail command
#[derive(Parser, Debug)]
pub struct TailArgs {
    /// Feed API key
    pub api_key: String,

    /// Feed endpoint base URL
    #[arg(long, env = "LIVEFEED_BASE_URL")]
    pub base_url: String,

    /// Cursor file path; created on the first successful fetch
    #[arg(long, default_value = "nextfrom_timestamp.txt")]
    pub cursor_file: PathBuf,

    /// Maximum number of posts per request
    #[arg(long, default_value_t = crate::poller::config::MAX_POSTS_CONTINUOUS,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub max_posts: u32,

    /// Expose a Prometheus scrape endpoint on this address
    #[arg(long)]
    pub metrics_addr: Option<SocketAddr>,
}

impl TailArgs {
    /// Execute the tail loop until a shutdown request arrives.
    pub async fn execute(&self, shutdown: SharedShutdown) -> Result<(), CliError> {
        if let Some(addr) = self.metrics_addr {
            metrics::init_metrics(addr)
                .map_err(|e| CliError::ConfigurationError(e.to_string()))?;
        }

        info!(
            cursor_file = %self.cursor_file.display(),
            max_posts = self.max_posts,
            "Starting live tail"
        );

        let fetcher = HttpFeedClient::new(&self.base_url, &self.api_key);
        let store = FileCursorStore::new(&self.cursor_file);
        let config = PollConfig::continuous_defaults().with_max_posts(self.max_posts);

        let controller = PollController::continuous(
            Box::new(fetcher),
            Box::new(CountingSink::new()),
            Box::new(store),
            config,
            shutdown,
        );

        let summary = controller.run().await;
        info!(
            posts = summary.posts,
            windows = summary.windows,
            "Live tail stopped"
        );
        Ok(())
    }
}
