//! Poll loop controller
//!
//! Drives the fetch/advance/persist/sink cycle as one sequential task. The
//! controller owns the cursor: windows are issued strictly one at a time,
//! because out-of-order window processing would corrupt the monotonic
//! cursor invariant. Cancellation is cooperative, checked at the top of
//! each cycle and during sleeps, never mid-fetch.

use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::cursor::CursorStore;
use crate::fetcher::FeedFetcher;
use crate::metrics;
use crate::shutdown::SharedShutdown;
use crate::sink::BatchSink;
use crate::QueryWindow;

use super::advance::{advance_watermark, Advancement};
use super::config::PollConfig;

/// Result of one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PollOutcome {
    /// The fetch succeeded and the watermark advanced.
    Progress {
        /// Start of the next window
        next_from: DateTime<Utc>,
        /// Pacing delay before the next cycle; zero means a full page made
        /// more data likely pending and the next query must go out
        /// immediately against the same `to` boundary
        sleep: Duration,
    },
    /// Bounded mode only: the remote range returned no posts and the
    /// backfill is complete.
    Exhausted,
    /// The fetch failed; retry after the fixed delay. The cursor is
    /// untouched.
    TransientFailure {
        /// Fixed delay before the retry
        retry_after: Duration,
    },
}

/// Why the poll loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Bounded mode drained the requested range.
    Exhausted,
    /// A shutdown request was observed at a suspension point.
    ShutdownRequested,
}

/// Final accounting for a finished poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSummary {
    /// Posts fetched since startup
    pub posts: u64,
    /// Windows fetched successfully
    pub windows: u64,
    /// Why the loop stopped
    pub stopped: StopReason,
}

enum Mode {
    Continuous,
    Bounded {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
}

/// Sequential poll loop over a feed port, a batch sink, and (in continuous
/// mode) a cursor store.
pub struct PollController {
    fetcher: Box<dyn FeedFetcher>,
    sink: Box<dyn BatchSink>,
    cursor_store: Option<Box<dyn CursorStore>>,
    config: PollConfig,
    mode: Mode,
    shutdown: SharedShutdown,
    pinned_to: Option<DateTime<Utc>>,
    posts_total: u64,
    windows_completed: u64,
}

impl PollController {
    /// Build a continuous-mode controller: runs until shutdown, resuming
    /// from the persisted cursor (or `now - default_lookback` without one).
    pub fn continuous(
        fetcher: Box<dyn FeedFetcher>,
        sink: Box<dyn BatchSink>,
        cursor_store: Box<dyn CursorStore>,
        config: PollConfig,
        shutdown: SharedShutdown,
    ) -> Self {
        Self {
            fetcher,
            sink,
            cursor_store: Some(cursor_store),
            config,
            mode: Mode::Continuous,
            shutdown,
            pinned_to: None,
            posts_total: 0,
            windows_completed: 0,
        }
    }

    /// Build a bounded-mode controller: drains `[from, to)` and terminates
    /// on the first empty batch. Callers must uphold `from < to`.
    pub fn bounded(
        fetcher: Box<dyn FeedFetcher>,
        sink: Box<dyn BatchSink>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        config: PollConfig,
        shutdown: SharedShutdown,
    ) -> Self {
        debug_assert!(from < to, "bounded range must satisfy from < to");
        Self {
            fetcher,
            sink,
            cursor_store: None,
            config,
            mode: Mode::Bounded { from, to },
            shutdown,
            pinned_to: None,
            posts_total: 0,
            windows_completed: 0,
        }
    }

    /// Run the loop to completion.
    ///
    /// Continuous mode returns only after a shutdown request; bounded mode
    /// also returns when the range is exhausted. Transient failures are
    /// retried indefinitely at a fixed cadence in both modes; there is no
    /// failure budget, so a permanently broken endpoint means indefinite
    /// retry rather than escalation.
    pub async fn run(mut self) -> PollSummary {
        let mut cursor = self.initial_cursor();
        info!(cursor = %cursor, "Poll loop started");

        loop {
            if self.shutdown.is_shutdown_requested() {
                return self.finish(StopReason::ShutdownRequested);
            }

            let to = match &self.mode {
                Mode::Bounded { to: range_end, .. } => {
                    let range_end = *range_end;
                    if cursor >= range_end {
                        // The watermark stepped past the range end after a
                        // batch near the boundary; nothing left to ask for.
                        info!("Watermark reached the end of the requested range");
                        return self.finish(StopReason::Exhausted);
                    }
                    range_end
                }
                Mode::Continuous => {
                    match self.pinned_to.take().filter(|pinned| cursor < *pinned) {
                        Some(pinned) => pinned,
                        None => {
                            let live_edge = Utc::now() - self.config.safety_skew_chrono();
                            if cursor >= live_edge {
                                debug!(
                                    cursor = %cursor,
                                    live_edge = %live_edge,
                                    "Caught up to the live edge, waiting for the window to open"
                                );
                                if !self.pause(self.config.target_interval).await {
                                    return self.finish(StopReason::ShutdownRequested);
                                }
                                continue;
                            }
                            live_edge
                        }
                    }
                }
            };

            let window = QueryWindow {
                from: cursor,
                to,
                max_posts: self.config.max_posts,
            };

            match self.poll_once(&window).await {
                PollOutcome::Progress { next_from, sleep } => {
                    cursor = next_from;
                    if sleep.is_zero() {
                        // Same `to` boundary on the immediate re-query:
                        // the pending posts live inside the original window.
                        self.pinned_to = Some(to);
                        info!("There is possibly more data available, trying again immediately");
                    } else if !self.pause(sleep).await {
                        return self.finish(StopReason::ShutdownRequested);
                    }
                }
                PollOutcome::Exhausted => {
                    info!(
                        total_posts = self.posts_total,
                        "Finished: requested range exhausted"
                    );
                    return self.finish(StopReason::Exhausted);
                }
                PollOutcome::TransientFailure { retry_after } => {
                    if !self.pause(retry_after).await {
                        return self.finish(StopReason::ShutdownRequested);
                    }
                }
            }
        }
    }

    /// Execute one fetch/advance/persist/sink cycle for the given window.
    ///
    /// On failure the cursor is left untouched and the outcome carries the
    /// fixed retry delay. On success the cursor is persisted before the
    /// batch reaches the sink, so a crash in between re-fetches at most one
    /// window's worth of already-seen data.
    pub async fn poll_once(&mut self, window: &QueryWindow) -> PollOutcome {
        info!(from = %window.from, to = %window.to, "Trying to fetch data");

        let started = Instant::now();
        let batch = match self.fetcher.fetch(window).await {
            Ok(batch) => batch,
            Err(e) => {
                warn!(
                    error = %e,
                    retry_after = ?self.config.retry_delay,
                    "Fetch failed, will retry"
                );
                metrics::record_transient_failure();
                return PollOutcome::TransientFailure {
                    retry_after: self.config.retry_delay,
                };
            }
        };
        let request_duration = started.elapsed();
        metrics::record_fetch(request_duration, batch.count);

        self.posts_total += batch.count;
        self.windows_completed += 1;
        info!(
            from = %window.from,
            to = %window.to,
            posts = batch.count,
            total_posts = self.posts_total,
            "Got posts"
        );

        let advancement = advance_watermark(window, &batch);

        if let (Mode::Bounded { .. }, Advancement::Drained { .. }) = (&self.mode, &advancement) {
            // Terminal empty window: no cursor to persist, nothing to sink.
            return PollOutcome::Exhausted;
        }

        let next_from = advancement.next_from();
        self.persist_cursor(next_from);
        self.route_to_sink(window, &batch);

        let sleep = match advancement {
            Advancement::Advanced {
                more_pending: true, ..
            } => Duration::ZERO,
            _ => self.config.target_interval.saturating_sub(request_duration),
        };

        PollOutcome::Progress { next_from, sleep }
    }

    fn initial_cursor(&self) -> DateTime<Utc> {
        match &self.mode {
            Mode::Bounded { from, .. } => *from,
            Mode::Continuous => {
                let default = Utc::now() - self.config.default_lookback_chrono();
                match self.cursor_store.as_ref().map(|store| store.load()) {
                    Some(Ok(Some(cursor))) => {
                        info!(cursor = %cursor, "Resuming from persisted cursor");
                        cursor
                    }
                    Some(Ok(None)) => {
                        info!(cursor = %default, "No persisted cursor, starting from default lookback");
                        default
                    }
                    Some(Err(e)) => {
                        warn!(
                            error = %e,
                            cursor = %default,
                            "Failed to load persisted cursor, starting from default lookback"
                        );
                        default
                    }
                    None => default,
                }
            }
        }
    }

    /// Best-effort cursor persistence: a failed save is logged and the next
    /// cycle proceeds, trading durability for liveness.
    fn persist_cursor(&self, next_from: DateTime<Utc>) {
        if let Some(store) = &self.cursor_store {
            if let Err(e) = store.save(next_from) {
                warn!(error = %e, cursor = %next_from, "Failed to persist cursor, continuing");
            }
        }
    }

    /// Sink failures never undo the cursor update that already happened:
    /// the batch's data may not have been durably sunk, which is reported
    /// here rather than silently masked.
    fn route_to_sink(&mut self, window: &QueryWindow, batch: &crate::Batch) {
        if let Err(e) = self.sink.consume(window, batch) {
            warn!(
                error = %e,
                from = %window.from,
                to = %window.to,
                "Sink failed to consume batch; cursor already advanced past it"
            );
        }
    }

    /// Sleep for `duration`, returning `false` if a shutdown request
    /// interrupted the wait.
    async fn pause(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            return !self.shutdown.is_shutdown_requested();
        }
        tokio::select! {
            _ = sleep(duration) => true,
            _ = self.shutdown.wait_for_shutdown() => {
                debug!("Shutdown requested during sleep");
                false
            }
        }
    }

    fn finish(&self, stopped: StopReason) -> PollSummary {
        let summary = PollSummary {
            posts: self.posts_total,
            windows: self.windows_completed,
            stopped,
        };
        info!(
            posts = summary.posts,
            windows = summary.windows,
            reason = ?summary.stopped,
            "Poll loop stopped"
        );
        summary
    }
}
