//! CLI command implementations

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

pub mod backfill;
pub mod error;
pub mod tail;

pub use backfill::BackfillArgs;
pub use error::CliError;
pub use tail::TailArgs;

/// Incremental polling client for count-and-timespan-bounded live feeds
#[derive(Parser, Debug)]
#[command(name = "livefeed-poller", version, about)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Tail the feed indefinitely, resuming from the persisted cursor
    Tail(TailArgs),
    /// Backfill an explicit [from, to) range and exit when it is drained
    Backfill(BackfillArgs),
}

/// Parse a CLI timestamp argument (`2024-01-01 00:00:00Z`, always UTC).
pub(crate) fn parse_cli_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    crate::parse_feed_timestamp(raw).map_err(|e| {
        format!("'{raw}' is not a valid timestamp (expected e.g. '2024-01-01 00:00:00Z'): {e}")
    })
}
