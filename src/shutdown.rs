//! Graceful shutdown coordination utilities.
//!
//! Provides a lightweight [`ShutdownHandle`] passed explicitly into the poll
//! loop so a signal listener (or a test) can request early termination. The
//! loop checks it only at suspension points; an in-flight fetch is never
//! preempted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Shared handle to a shutdown request.
pub type SharedShutdown = Arc<ShutdownHandle>;

/// Coordinates cooperative shutdown across async tasks.
#[derive(Debug, Default)]
pub struct ShutdownHandle {
    is_shutdown: AtomicBool,
    notify: Notify,
}

impl ShutdownHandle {
    /// Create a new handle.
    pub fn new() -> Self {
        Self {
            is_shutdown: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    /// Create a new shared handle wrapped in [`Arc`].
    pub fn shared() -> SharedShutdown {
        Arc::new(Self::new())
    }

    /// Request shutdown. Notifies all waiters exactly once.
    pub fn request_shutdown(&self) {
        if !self.is_shutdown.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
        }
    }

    /// Whether shutdown has been requested.
    pub fn is_shutdown_requested(&self) -> bool {
        self.is_shutdown.load(Ordering::SeqCst)
    }

    /// Wait until shutdown is requested. Returns immediately if already set.
    pub async fn wait_for_shutdown(&self) {
        // Register interest before checking the flag so a request landing
        // between the check and the await is not missed.
        let notified = self.notify.notified();
        if self.is_shutdown_requested() {
            return;
        }
        notified.await;
    }
}
