//! File readiness probing
//!
//! Synced files commonly arrive in pieces: the path exists while the
//! content is still streaming in, and the file may be locked between
//! writes. Nothing may act on a file until it passes this probe.

use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::time::Instant;

/// Decides whether a file on disk has finished being written.
///
/// Each poll attempts an open plus a partial read (a locked or vanished
/// file is simply "not ready yet"), then reads the size twice across a
/// short gap. The file is accepted only when both sizes agree and are
/// non-zero; a file that is unlocked between writes but still growing
/// fails the double size check even though the open succeeded.
#[derive(Debug, Clone)]
pub struct ReadinessProbe {
    /// Pause between polls.
    pub poll_interval: Duration,
    /// Gap between the two size reads of a single poll.
    pub stability_gap: Duration,
    /// Total time budget before the file is declared not ready.
    pub timeout: Duration,
}

impl Default for ReadinessProbe {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            stability_gap: Duration::from_millis(500),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ReadinessProbe {
    /// Poll until the file is stable or the timeout is exhausted.
    ///
    /// Returns `false` on timeout; the caller must not print a file that
    /// failed readiness.
    pub async fn wait_ready(&self, path: &Path) -> bool {
        let deadline = Instant::now() + self.timeout;

        while Instant::now() < deadline {
            if self.probe_once(path).await {
                return true;
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        false
    }

    async fn probe_once(&self, path: &Path) -> bool {
        // Open failure usually means the file is still locked by the sync
        // process; retry on the next poll rather than giving up.
        let mut file = match tokio::fs::File::open(path).await {
            Ok(file) => file,
            Err(_) => return false,
        };

        let mut buf = [0u8; 1024];
        if file.read(&mut buf).await.is_err() {
            return false;
        }

        let size_before = match tokio::fs::metadata(path).await {
            Ok(meta) => meta.len(),
            Err(_) => return false,
        };

        tokio::time::sleep(self.stability_gap).await;

        let size_after = match tokio::fs::metadata(path).await {
            Ok(meta) => meta.len(),
            Err(_) => return false,
        };

        size_before == size_after && size_before > 0
    }
}
