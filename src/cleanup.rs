//! Deferred removal of temporary files.
//!
//! The companion reads the PDF some time after `/send-invoice` returns, so
//! the file is deleted later instead of immediately.

use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Remove `path` after `delay` on a background task.
///
/// A file that is already gone, or any other removal failure, is ignored.
pub fn schedule_removal(path: PathBuf, delay: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "Temporary PDF removed"),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Temporary PDF not removed")
            }
        }
    })
}
