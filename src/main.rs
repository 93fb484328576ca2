//! Main entry point for the livefeed-poller CLI

use clap::Parser;
use livefeed_poller::cli::{Cli, Commands};
use livefeed_poller::shutdown::ShutdownHandle;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber with optional JSON formatting
fn init_tracing() {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("livefeed_poller=info"));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    // The shutdown handle is passed explicitly to everything that needs it;
    // the Ctrl+C listener is the only writer.
    let shutdown = ShutdownHandle::shared();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Ctrl+C received - finishing the current cycle before exiting");
                shutdown.request_shutdown();
            }
        }
    });

    let result = match cli.command {
        Commands::Tail(ref args) => args
            .execute(shutdown.clone())
            .await
            .map_err(|e| anyhow::anyhow!(e)),
        Commands::Backfill(ref args) => args
            .execute(shutdown.clone())
            .await
            .map_err(|e| anyhow::anyhow!(e)),
    };

    if let Err(e) = result {
        error!("Command failed: {e}");
        std::process::exit(1);
    }
}
