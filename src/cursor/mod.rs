//! Durable cursor persistence
//!
//! The cursor is a single UTC timestamp meaning "fetch everything strictly
//! after this instant". The file store writes it atomically (temp file in
//! the same directory, fsync, rename) under an advisory lock, so a crash
//! mid-save leaves either the old or the new value, never a torn one.

use chrono::{DateTime, Utc};
use fd_lock::RwLock;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::format_cursor_timestamp;

/// Errors related to cursor persistence
#[derive(Debug, thiserror::Error)]
pub enum CursorError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// Persisted cursor content could not be parsed
    #[error("malformed cursor '{content}': {reason}")]
    Malformed {
        /// The content found in the cursor file
        content: String,
        /// Why it failed to parse
        reason: String,
    },

    /// Lock error
    #[error("lock error: {0}")]
    LockError(String),
}

/// Result type for cursor operations
pub type CursorResult<T> = Result<T, CursorError>;

/// Port to durable cursor storage.
///
/// The store treats the cursor as opaque: interpretation (default lookback,
/// window construction) belongs to the poll loop controller.
pub trait CursorStore: Send + Sync {
    /// Load the last persisted cursor, or `None` if none exists.
    fn load(&self) -> CursorResult<Option<DateTime<Utc>>>;

    /// Durably persist the cursor.
    fn save(&self, cursor: DateTime<Utc>) -> CursorResult<()>;
}

/// File-backed cursor store.
///
/// Stores one RFC 3339 nanosecond-precision UTC timestamp at a fixed path.
pub struct FileCursorStore {
    path: PathBuf,
}

impl FileCursorStore {
    /// Create a store at the given path. Nothing is touched on disk until
    /// the first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path this store persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_file(&self) -> CursorResult<std::fs::File> {
        let lock_path = self.path.with_extension("lock");
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| CursorError::LockError(format!("failed to create lock file: {e}")))
    }
}

impl CursorStore for FileCursorStore {
    fn load(&self) -> CursorResult<Option<DateTime<Utc>>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No cursor file, starting fresh");
            return Ok(None);
        }

        let lock = RwLock::new(self.lock_file()?);
        let _guard = lock
            .read()
            .map_err(|e| CursorError::LockError(format!("failed to acquire read lock: {e}")))?;

        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| CursorError::IoError(e.to_string()))?;
        let trimmed = content.trim();

        let parsed = DateTime::parse_from_rfc3339(trimmed).map_err(|e| CursorError::Malformed {
            content: trimmed.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Some(parsed.with_timezone(&Utc)))
    }

    fn save(&self, cursor: DateTime<Utc>) -> CursorResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| CursorError::IoError(e.to_string()))?;
            }
        }

        let mut lock = RwLock::new(self.lock_file()?);
        let _guard = lock
            .write()
            .map_err(|e| CursorError::LockError(format!("failed to acquire write lock: {e}")))?;

        let parent_dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp_file = tempfile::NamedTempFile::new_in(parent_dir)
            .map_err(|e| CursorError::IoError(format!("failed to create temp file: {e}")))?;

        temp_file
            .write_all(format_cursor_timestamp(cursor).as_bytes())
            .map_err(|e| CursorError::IoError(format!("failed to write temp file: {e}")))?;
        temp_file
            .flush()
            .map_err(|e| CursorError::IoError(format!("failed to flush temp file: {e}")))?;
        temp_file
            .as_file()
            .sync_all()
            .map_err(|e| CursorError::IoError(format!("failed to sync temp file: {e}")))?;

        temp_file
            .persist(&self.path)
            .map_err(|e| CursorError::IoError(format!("failed to persist temp file: {e}")))?;

        // Fsync the parent directory so the rename itself is durable.
        if let Ok(dir) = std::fs::File::open(parent_dir) {
            let _ = dir.sync_all();
        }

        info!(
            path = %self.path.display(),
            cursor = %cursor,
            "Cursor persisted"
        );

        Ok(())
    }
}
