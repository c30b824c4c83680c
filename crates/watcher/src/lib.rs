//! Directory watching for Dropspool
//!
//! Bridges OS file-creation notifications into the arrival channel the
//! pipeline consumes. The watch is non-recursive: only files landing
//! directly in the configured folder count as arrivals, so the archive
//! subdirectory never feeds back into the pipeline.

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, error};

/// Forwards created-file paths from the watched folder to a channel.
///
/// The watch lives as long as this value; dropping it stops event
/// delivery. Watcher errors are logged, not fatal; a missed event is
/// recovered by the next startup scan.
pub struct ArrivalWatcher {
    _watcher: RecommendedWatcher,
}

impl ArrivalWatcher {
    /// Start watching `folder`, sending each newly created regular file
    /// into `tx`.
    pub fn start(folder: &Path, tx: mpsc::UnboundedSender<PathBuf>) -> Result<Self> {
        let mut watcher = notify::recommended_watcher(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !matches!(event.kind, EventKind::Create(_)) {
                        return;
                    }
                    for path in event.paths {
                        // The archive subdirectory is created inside the
                        // watch folder; directory creations are not
                        // arrivals.
                        if !path.is_file() {
                            continue;
                        }
                        debug!("File created: {}", path.display());
                        if tx.send(path).is_err() {
                            // Receiver gone, daemon is shutting down
                            return;
                        }
                    }
                }
                Err(e) => error!("Watch error: {:?}", e),
            },
        )
        .context("Failed to create filesystem watcher")?;

        watcher
            .watch(folder, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", folder.display()))?;

        Ok(Self { _watcher: watcher })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_created_file_is_delivered() {
        let temp_dir = TempDir::new().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _watch = ArrivalWatcher::start(temp_dir.path(), tx).unwrap();

        // Give the OS watcher a moment to arm
        tokio::time::sleep(Duration::from_millis(200)).await;

        let path = temp_dir.path().join("report.pdf");
        fs::write(&path, b"%PDF").unwrap();

        let delivered = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no event within timeout")
            .expect("channel closed");
        assert_eq!(delivered, path);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_directory_creation_is_not_an_arrival() {
        let temp_dir = TempDir::new().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _watch = ArrivalWatcher::start(temp_dir.path(), tx).unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;

        fs::create_dir(temp_dir.path().join("printed")).unwrap();

        // Follow with a real file so we have a bound on how long to wait
        let path = temp_dir.path().join("after.pdf");
        fs::write(&path, b"%PDF").unwrap();

        let delivered = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no event within timeout")
            .expect("channel closed");
        assert_eq!(delivered, path);
    }

    #[test]
    fn test_watch_missing_folder_fails() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");
        let (tx, _rx) = mpsc::unbounded_channel();

        assert!(ArrivalWatcher::start(&missing, tx).is_err());
    }
}
