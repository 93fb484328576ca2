//! Batch consumers
//!
//! A sink consumes each successfully fetched batch for side effects. Sink
//! failure is independent of fetch/advance logic: the controller logs it
//! and carries on, and it never rolls back a cursor update that already
//! happened.

use crate::{Batch, QueryWindow};

pub mod count;
pub mod window_file;

pub use count::CountingSink;
pub use window_file::WindowFileSink;

/// Sink errors
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    SerializationError(String),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Consumer of fetched batches.
pub trait BatchSink: Send + Sync {
    /// Consume one batch fetched for the given window.
    fn consume(&mut self, window: &QueryWindow, batch: &Batch) -> SinkResult<()>;
}
