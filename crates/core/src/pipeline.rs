//! Arrival pipeline
//!
//! Orchestrates one file's trip from "appeared in the watch folder" to
//! "printed and archived": readiness probe, settle delay, claim, dispatch,
//! post-print delay, resolve. Every failure is contained here; a bad file
//! is logged and abandoned, never allowed to stop the watch loop.

use crate::archive;
use crate::claims::ClaimSet;
use crate::config::Config;
use crate::readiness::ReadinessProbe;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// The print capability the pipeline dispatches through.
///
/// Implementations never propagate errors: every failure collapses to
/// `false` with the reason logged, and the pipeline decides whether the
/// file stays eligible for retry.
#[async_trait]
pub trait PrintDispatch: Send + Sync {
    async fn print(&self, path: &Path) -> bool;
}

/// Where one pass through the per-file sequence ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Extension not recognized, or the path was already claimed.
    Skipped,
    /// Never stabilized within the readiness timeout; not claimed, so a
    /// future arrival event or rescan retries it.
    NotReady,
    /// Dispatch reported failure; the claim was released for retry.
    PrintFailed,
    /// Printed, and where configured, moved or deleted.
    Printed,
}

/// Sequences arrivals through readiness, dispatch, and resolution.
pub struct ArrivalPipeline {
    config: Arc<Config>,
    probe: ReadinessProbe,
    dispatcher: Arc<dyn PrintDispatch>,
    claims: ClaimSet,
}

impl ArrivalPipeline {
    pub fn new(config: Arc<Config>, dispatcher: Arc<dyn PrintDispatch>) -> Self {
        Self {
            config,
            probe: ReadinessProbe::default(),
            dispatcher,
            claims: ClaimSet::new(),
        }
    }

    /// Override the readiness timing (tests use short intervals).
    pub fn with_probe(mut self, probe: ReadinessProbe) -> Self {
        self.probe = probe;
        self
    }

    /// Run one file through the arrival sequence.
    pub async fn process(&self, path: &Path) -> Outcome {
        if !self.config.matches_extension(path) {
            return Outcome::Skipped;
        }

        if self.claims.contains(path) {
            debug!("Already processed, skipping: {}", path.display());
            return Outcome::Skipped;
        }

        info!("Waiting for file to be ready: {}", path.display());
        if !self.probe.wait_ready(path).await {
            warn!(
                "File not ready after {:?}: {}",
                self.probe.timeout,
                path.display()
            );
            return Outcome::NotReady;
        }

        // Extra settle time on top of readiness, for sync tools that
        // reopen the file shortly after the last write.
        sleep(self.config.settle_delay()).await;

        // Claim before dispatching so a concurrent arrival event for the
        // same path cannot double-print while this attempt is in flight.
        if !self.claims.claim(path) {
            debug!("Claimed by a concurrent arrival, skipping: {}", path.display());
            return Outcome::Skipped;
        }

        let printed = self.dispatcher.print(path).await;

        // Charged even when dispatch failed: the job needs time to leave
        // the spooler before the move/delete touches the file.
        sleep(self.config.post_print_delay()).await;

        if printed {
            archive::resolve(path, &self.config);
            Outcome::Printed
        } else {
            error!("Failed to print: {}", path.display());
            self.claims.release(path);
            Outcome::PrintFailed
        }
    }

    /// Process files already sitting in the watch folder at startup,
    /// each through the same sequence as a live arrival.
    ///
    /// Non-recursive; the archive subdirectory is never scanned.
    pub async fn scan_existing(&self) -> Result<()> {
        info!("Checking for existing files in watch folder...");

        let mut found: Vec<PathBuf> = Vec::new();
        let entries = std::fs::read_dir(&self.config.watch_folder).with_context(|| {
            format!(
                "Failed to read watch folder {}",
                self.config.watch_folder.display()
            )
        })?;

        for entry in entries {
            let entry = entry.context("Failed to read watch folder entry")?;
            let path = entry.path();
            if path.is_file() && self.config.matches_extension(&path) {
                found.push(path);
            }
        }

        found.sort();

        for path in found {
            info!("Found existing file: {}", path.display());
            self.process(&path).await;
        }

        Ok(())
    }

    pub fn claims(&self) -> &ClaimSet {
        &self.claims
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Records dispatched paths; result and latency are configurable.
    struct MockDispatch {
        calls: Mutex<Vec<PathBuf>>,
        succeed: AtomicBool,
        delay: Duration,
    }

    impl MockDispatch {
        fn new(succeed: bool) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                succeed: AtomicBool::new(succeed),
                delay: Duration::ZERO,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn calls(&self) -> Vec<PathBuf> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PrintDispatch for MockDispatch {
        async fn print(&self, path: &Path) -> bool {
            self.calls.lock().unwrap().push(path.to_path_buf());
            if !self.delay.is_zero() {
                sleep(self.delay).await;
            }
            self.succeed.load(Ordering::SeqCst)
        }
    }

    fn test_config(watch: &Path) -> Config {
        Config {
            watch_folder: watch.to_path_buf(),
            print_delay_seconds: 0,
            move_delete_delay_seconds: 0,
            ..Config::default()
        }
    }

    fn test_probe() -> ReadinessProbe {
        ReadinessProbe {
            poll_interval: Duration::from_millis(10),
            stability_gap: Duration::from_millis(10),
            timeout: Duration::from_millis(300),
        }
    }

    fn pipeline_with(
        config: Config,
        dispatcher: Arc<MockDispatch>,
    ) -> ArrivalPipeline {
        ArrivalPipeline::new(Arc::new(config), dispatcher).with_probe(test_probe())
    }

    #[tokio::test]
    async fn test_unrecognized_extension_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.txt");
        fs::write(&path, b"plain text").unwrap();

        let dispatcher = Arc::new(MockDispatch::new(true));
        let pipeline = pipeline_with(test_config(temp_dir.path()), dispatcher.clone());

        assert_eq!(pipeline.process(&path).await, Outcome::Skipped);
        assert!(dispatcher.calls().is_empty());
        assert!(pipeline.claims().is_empty());
    }

    #[tokio::test]
    async fn test_unready_file_never_dispatched() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.pdf");
        fs::write(&path, b"").unwrap();

        let dispatcher = Arc::new(MockDispatch::new(true));
        let pipeline = pipeline_with(test_config(temp_dir.path()), dispatcher.clone());

        assert_eq!(pipeline.process(&path).await, Outcome::NotReady);
        assert!(dispatcher.calls().is_empty());
        // Not claimed, so a later arrival retries from scratch
        assert!(pipeline.claims().is_empty());
    }

    #[tokio::test]
    async fn test_successful_print_archives_and_keeps_claim() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.pdf");
        fs::write(&path, b"%PDF content").unwrap();

        let dispatcher = Arc::new(MockDispatch::new(true));
        let pipeline = pipeline_with(test_config(temp_dir.path()), dispatcher.clone());

        assert_eq!(pipeline.process(&path).await, Outcome::Printed);
        assert_eq!(dispatcher.calls(), vec![path.clone()]);
        assert!(!path.exists());
        assert!(pipeline.claims().contains(&path));

        let archived: Vec<_> = fs::read_dir(temp_dir.path().join("printed"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(archived.len(), 1);
        assert!(archived[0].starts_with("report_"));
    }

    #[tokio::test]
    async fn test_failed_print_releases_claim_for_retry() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.pdf");
        fs::write(&path, b"%PDF content").unwrap();

        let dispatcher = Arc::new(MockDispatch::new(false));
        let pipeline = pipeline_with(test_config(temp_dir.path()), dispatcher.clone());

        assert_eq!(pipeline.process(&path).await, Outcome::PrintFailed);
        assert!(path.exists());
        assert!(pipeline.claims().is_empty());

        // The retry re-enters the sequence and dispatches again
        dispatcher.succeed.store(true, Ordering::SeqCst);
        assert_eq!(pipeline.process(&path).await, Outcome::Printed);
        assert_eq!(dispatcher.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_claimed_path_is_not_reprocessed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.pdf");
        fs::write(&path, b"%PDF content").unwrap();

        let config = Config {
            move_after_print: false,
            ..test_config(temp_dir.path())
        };
        let dispatcher = Arc::new(MockDispatch::new(true));
        let pipeline = pipeline_with(config, dispatcher.clone());

        assert_eq!(pipeline.process(&path).await, Outcome::Printed);
        // File was left in place; only the claim prevents a second print
        assert!(path.exists());
        assert_eq!(pipeline.process(&path).await, Outcome::Skipped);
        assert_eq!(dispatcher.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_arrivals_print_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.pdf");
        fs::write(&path, b"%PDF content").unwrap();

        let dispatcher =
            Arc::new(MockDispatch::new(true).with_delay(Duration::from_millis(100)));
        let pipeline = Arc::new(pipeline_with(
            test_config(temp_dir.path()),
            dispatcher.clone(),
        ));

        // Both arrivals pass the not-yet-claimed check and race to claim
        let a = tokio::spawn({
            let pipeline = pipeline.clone();
            let path = path.clone();
            async move { pipeline.process(&path).await }
        });
        let b = tokio::spawn({
            let pipeline = pipeline.clone();
            let path = path.clone();
            async move { pipeline.process(&path).await }
        });

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert_eq!(dispatcher.calls().len(), 1);
        assert!(matches!(
            (a, b),
            (Outcome::Printed, Outcome::Skipped) | (Outcome::Skipped, Outcome::Printed)
        ));
    }

    #[tokio::test]
    async fn test_scan_existing_processes_watch_folder_once() {
        let temp_dir = TempDir::new().unwrap();
        let old = temp_dir.path().join("old.pdf");
        fs::write(&old, b"%PDF old").unwrap();
        fs::write(temp_dir.path().join("skip.txt"), b"not a pdf").unwrap();

        // Already-archived files must not be rescanned
        let printed = temp_dir.path().join("printed");
        fs::create_dir_all(&printed).unwrap();
        fs::write(printed.join("done_20240101_120000.pdf"), b"%PDF done").unwrap();

        let dispatcher = Arc::new(MockDispatch::new(true));
        let pipeline = pipeline_with(test_config(temp_dir.path()), dispatcher.clone());

        pipeline.scan_existing().await.unwrap();

        assert_eq!(dispatcher.calls(), vec![old.clone()]);
        assert!(!old.exists());
    }
}
