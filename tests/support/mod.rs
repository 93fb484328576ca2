//! Shared test doubles for the poll loop

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use livefeed_poller::cursor::{CursorResult, CursorStore};
use livefeed_poller::fetcher::{FeedFetcher, FetcherError, FetcherResult};
use livefeed_poller::sink::{BatchSink, SinkResult};
use livefeed_poller::{Batch, LastPostMarker, Post, QueryWindow};

/// Shared record of every window submitted to a scripted fetcher.
#[derive(Clone, Default)]
pub struct WindowLog(pub Arc<Mutex<Vec<QueryWindow>>>);

impl WindowLog {
    pub fn windows(&self) -> Vec<QueryWindow> {
        self.0.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

/// Fetcher that replays a scripted sequence of results, then returns empty
/// batches forever.
pub struct ScriptedFetcher {
    responses: Mutex<VecDeque<FetcherResult<Batch>>>,
    log: WindowLog,
}

impl ScriptedFetcher {
    pub fn new(responses: Vec<FetcherResult<Batch>>) -> (Self, WindowLog) {
        let log = WindowLog::default();
        (
            Self {
                responses: Mutex::new(responses.into()),
                log: log.clone(),
            },
            log,
        )
    }
}

#[async_trait]
impl FeedFetcher for ScriptedFetcher {
    async fn fetch(&self, window: &QueryWindow) -> FetcherResult<Batch> {
        self.log.0.lock().unwrap().push(*window);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Batch::empty("{}")))
    }
}

/// Shared record of every batch a recording sink consumed.
#[derive(Clone, Default)]
pub struct SinkLog(pub Arc<Mutex<Vec<(QueryWindow, Batch)>>>);

impl SinkLog {
    pub fn consumed(&self) -> Vec<(QueryWindow, Batch)> {
        self.0.lock().unwrap().clone()
    }
}

/// Sink that records everything it consumes.
#[derive(Default)]
pub struct RecordingSink {
    log: SinkLog,
}

impl RecordingSink {
    pub fn new() -> (Self, SinkLog) {
        let sink = Self::default();
        let log = sink.log.clone();
        (sink, log)
    }
}

impl BatchSink for RecordingSink {
    fn consume(&mut self, window: &QueryWindow, batch: &Batch) -> SinkResult<()> {
        self.log.0.lock().unwrap().push((*window, batch.clone()));
        Ok(())
    }
}

/// Shared record of every cursor an in-memory store persisted.
#[derive(Clone, Default)]
pub struct SaveLog(pub Arc<Mutex<Vec<DateTime<Utc>>>>);

impl SaveLog {
    pub fn saves(&self) -> Vec<DateTime<Utc>> {
        self.0.lock().unwrap().clone()
    }
}

/// In-memory cursor store with a scripted initial value.
pub struct MemoryCursorStore {
    initial: Option<DateTime<Utc>>,
    log: SaveLog,
}

impl MemoryCursorStore {
    pub fn new(initial: Option<DateTime<Utc>>) -> (Self, SaveLog) {
        let log = SaveLog::default();
        (
            Self {
                initial,
                log: log.clone(),
            },
            log,
        )
    }
}

impl CursorStore for MemoryCursorStore {
    fn load(&self) -> CursorResult<Option<DateTime<Utc>>> {
        Ok(self.initial)
    }

    fn save(&self, cursor: DateTime<Utc>) -> CursorResult<()> {
        self.log.0.lock().unwrap().push(cursor);
        Ok(())
    }
}

/// A non-empty batch whose last post sits at `timestamp + sub_ms`.
pub fn batch(count: u64, timestamp: DateTime<Utc>, sub_ms: f64) -> Batch {
    Batch {
        count,
        posts: (0..count)
            .map(|i| Post {
                id: Some(i.to_string()),
                url: format!("https://example.com/{i}"),
                published: None,
            })
            .collect(),
        last_post: Some(LastPostMarker { timestamp, sub_ms }),
        raw: format!(r#"{{"noOfPosts": {count}}}"#),
    }
}

/// A transient transport failure.
pub fn transport_error() -> FetcherError {
    FetcherError::NetworkError("connection refused".to_string())
}
