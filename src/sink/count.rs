//! Counting sink for continuous tailing

use tracing::info;

use crate::{Batch, QueryWindow};

use super::{BatchSink, SinkResult};

/// Sink that accumulates post totals and reports them through the log.
#[derive(Debug, Default)]
pub struct CountingSink {
    total_posts: u64,
}

impl CountingSink {
    /// Create a sink with a zero total.
    pub fn new() -> Self {
        Self::default()
    }

    /// Posts consumed since creation.
    pub fn total_posts(&self) -> u64 {
        self.total_posts
    }
}

impl BatchSink for CountingSink {
    fn consume(&mut self, window: &QueryWindow, batch: &Batch) -> SinkResult<()> {
        self.total_posts += batch.posts.len() as u64;
        info!(
            from = %window.from,
            to = %window.to,
            received = batch.posts.len(),
            total_posts = self.total_posts,
            "Received posts"
        );
        Ok(())
    }
}
