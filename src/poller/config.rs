//! Poll loop tuning constants and configuration

use std::time::Duration;

/// Target polling interval for continuous mode.
/// The long-run cadence tracks this value: each sleep is shortened by the
/// time the request itself took, so slow fetches do not stretch the cycle.
pub const TARGET_POLL_INTERVAL: Duration = Duration::from_secs(4 * 60);

/// Fixed delay before retrying after a transient failure in continuous mode.
pub const RETRY_DELAY_CONTINUOUS: Duration = Duration::from_secs(60);

/// Fixed delay before retrying after a transient failure in bounded mode.
/// Shorter than continuous mode: a backfill is usually operator-attended.
pub const RETRY_DELAY_BOUNDED: Duration = Duration::from_secs(30);

/// Safety margin subtracted from "now" when computing the window's `to`
/// edge in continuous mode. Keeps the window behind the feed service's own
/// clock even when the two clocks are somewhat out of sync.
pub const SAFETY_SKEW: Duration = Duration::from_secs(5 * 60);

/// Lookback applied when no persisted cursor exists: start fetching from
/// this far in the past.
pub const DEFAULT_LOOKBACK: Duration = Duration::from_secs(60 * 60);

/// Default page cap for continuous mode.
pub const MAX_POSTS_CONTINUOUS: u32 = 1000;

/// Default page cap for bounded mode.
pub const MAX_POSTS_BOUNDED: u32 = 100;

/// Tuning knobs for a [`PollController`](crate::poller::PollController).
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Page cap per request; must be positive
    pub max_posts: u32,
    /// Target cycle length in continuous mode
    pub target_interval: Duration,
    /// Fixed delay between retries of a failed fetch
    pub retry_delay: Duration,
    /// Margin subtracted from "now" for the continuous-mode `to` edge
    pub safety_skew: Duration,
    /// Cursor default when none is persisted: `now - default_lookback`
    pub default_lookback: Duration,
}

impl PollConfig {
    /// Defaults for continuous live tailing.
    pub fn continuous_defaults() -> Self {
        Self {
            max_posts: MAX_POSTS_CONTINUOUS,
            target_interval: TARGET_POLL_INTERVAL,
            retry_delay: RETRY_DELAY_CONTINUOUS,
            safety_skew: SAFETY_SKEW,
            default_lookback: DEFAULT_LOOKBACK,
        }
    }

    /// Defaults for a bounded backfill.
    pub fn bounded_defaults() -> Self {
        Self {
            max_posts: MAX_POSTS_BOUNDED,
            target_interval: TARGET_POLL_INTERVAL,
            retry_delay: RETRY_DELAY_BOUNDED,
            safety_skew: SAFETY_SKEW,
            default_lookback: DEFAULT_LOOKBACK,
        }
    }

    /// Override the page cap.
    pub fn with_max_posts(mut self, max_posts: u32) -> Self {
        self.max_posts = max_posts;
        self
    }

    /// Skew as a chrono duration for timestamp arithmetic.
    pub(crate) fn safety_skew_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.safety_skew).unwrap_or_else(|_| chrono::Duration::zero())
    }

    /// Lookback as a chrono duration for timestamp arithmetic.
    pub(crate) fn default_lookback_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.default_lookback)
            .unwrap_or_else(|_| chrono::Duration::zero())
    }
}
