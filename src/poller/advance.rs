//! Watermark advancement
//!
//! The core cursor arithmetic: given the window just queried and the batch
//! it produced, compute where the next window must start. Pure and
//! deterministic; all I/O and policy live in the controller.

use chrono::{DateTime, Duration, Utc};

use crate::{Batch, QueryWindow};

/// Nanoseconds per millisecond, as a float for offset conversion.
const NANOS_PER_MS: f64 = 1_000_000.0;

/// Outcome of interpreting one batch against the window that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Advancement {
    /// The batch carried posts; the watermark steps strictly past the last
    /// delivered post.
    Advanced {
        /// Start of the next window
        next_from: DateTime<Utc>,
        /// The page was full (`count >= max_posts`), so more matching posts
        /// may still be pending in the same window: re-query immediately
        /// with the same `to` and do not sleep.
        more_pending: bool,
    },
    /// The window contained no posts. Everything up to the queried `to` is
    /// known fetched; in continuous mode the watermark moves to `to`, in
    /// bounded mode the range is exhausted.
    Drained {
        /// The queried `to`, now a safe watermark
        next_from: DateTime<Utc>,
    },
}

impl Advancement {
    /// Start of the next window regardless of variant.
    pub fn next_from(&self) -> DateTime<Utc> {
        match self {
            Advancement::Advanced { next_from, .. } | Advancement::Drained { next_from } => {
                *next_from
            }
        }
    }
}

/// Compute the next watermark from a window and its result batch.
///
/// For a non-empty batch the next `from` is the last post's coarse
/// timestamp plus its fractional sub-millisecond offset plus one strict
/// millisecond. The feed's timestamp resolution is coarser than its true
/// event ordering; the offset plus the increment starts the next window
/// strictly after the last delivered post without skipping any post that
/// shares the same coarse timestamp.
///
/// A batch reporting `count > 0` without a last-post marker is rejected at
/// parse time and never reaches this function.
pub fn advance_watermark(window: &QueryWindow, batch: &Batch) -> Advancement {
    match batch.last_post {
        Some(marker) => {
            let offset_nanos = ((marker.sub_ms + 1.0) * NANOS_PER_MS).round() as i64;
            let next_from = marker.timestamp + Duration::nanoseconds(offset_nanos);
            Advancement::Advanced {
                next_from,
                more_pending: batch.count >= u64::from(window.max_posts),
            }
        }
        None => Advancement::Drained {
            next_from: window.to,
        },
    }
}
