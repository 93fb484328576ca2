//! Observability metrics for the poll loop
//!
//! Uses the `metrics` facade for low-overhead collection; with no recorder
//! installed every call is a no-op. `tail` can expose a Prometheus scrape
//! endpoint via [`init_metrics`].

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;

/// Install the Prometheus exporter and register metric descriptions.
///
/// Call at most once, at startup. Fails if the listener cannot bind or a
/// recorder is already installed.
pub fn init_metrics(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    info!(addr = %addr, "Initializing metrics endpoint");

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        "feed_fetches_total",
        Unit::Count,
        "Total number of successful feed window fetches"
    );
    describe_counter!(
        "feed_posts_total",
        Unit::Count,
        "Total number of posts reported by fetched batches"
    );
    describe_counter!(
        "feed_transient_failures_total",
        Unit::Count,
        "Total number of fetch attempts that failed and were retried"
    );
    describe_histogram!(
        "feed_request_duration_seconds",
        Unit::Seconds,
        "Feed request duration in seconds"
    );

    Ok(())
}

/// Record one successful fetch.
pub fn record_fetch(request_duration: Duration, posts: u64) {
    counter!("feed_fetches_total").increment(1);
    counter!("feed_posts_total").increment(posts);
    histogram!("feed_request_duration_seconds").record(request_duration.as_secs_f64());
}

/// Record one transient fetch failure.
pub fn record_transient_failure() {
    counter!("feed_transient_failures_total").increment(1);
}
