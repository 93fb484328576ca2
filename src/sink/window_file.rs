//! Per-window file sink for bounded backfills
//!
//! Writes each batch's raw payload to one file per query window, named
//! deterministically from the window's `from` timestamp so a re-run over
//! the same range produces the same file set.

use std::path::PathBuf;
use tracing::debug;

use crate::{format_feed_timestamp, Batch, QueryWindow};

use super::{BatchSink, SinkError, SinkResult};

/// Replacement for characters that are unsafe in file names.
const REPLACEMENT: char = '_';

/// Characters substituted by [`REPLACEMENT`] in generated file names.
/// Windows' invalid set plus the path separators; control characters are
/// substituted as well.
const UNSAFE_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Substitute filesystem-unsafe characters in a file name.
pub fn safe_filename(unsafe_name: &str) -> String {
    unsafe_name
        .chars()
        .map(|c| {
            if UNSAFE_CHARS.contains(&c) || c.is_control() {
                REPLACEMENT
            } else {
                c
            }
        })
        .collect()
}

/// Sink that writes one `{from}.json` payload file per window.
#[derive(Debug)]
pub struct WindowFileSink {
    output_dir: PathBuf,
    files_written: u64,
}

impl WindowFileSink {
    /// Create a sink writing into the given directory. The directory is
    /// created on the first write.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            files_written: 0,
        }
    }

    /// Files written since creation.
    pub fn files_written(&self) -> u64 {
        self.files_written
    }

    /// Output file path for a window.
    pub fn file_path(&self, window: &QueryWindow) -> PathBuf {
        let name = safe_filename(&format_feed_timestamp(window.from));
        self.output_dir.join(format!("{name}.json"))
    }

    fn ensure_output_dir(&self) -> SinkResult<()> {
        if !self.output_dir.as_os_str().is_empty() && !self.output_dir.exists() {
            std::fs::create_dir_all(&self.output_dir)
                .map_err(|e| SinkError::IoError(format!("creating output directory: {e}")))?;
        }
        Ok(())
    }
}

impl BatchSink for WindowFileSink {
    fn consume(&mut self, window: &QueryWindow, batch: &Batch) -> SinkResult<()> {
        self.ensure_output_dir()?;

        let path = self.file_path(window);
        std::fs::write(&path, batch.raw.as_bytes()).map_err(|e| {
            SinkError::IoError(format!("writing batch to {}: {e}", path.display()))
        })?;
        self.files_written += 1;

        debug!(
            path = %path.display(),
            posts = batch.posts.len(),
            "Wrote window payload"
        );
        Ok(())
    }
}
