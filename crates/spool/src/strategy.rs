//! Print strategies
//!
//! Two interchangeable ways to hand a ready file to a printer: spawning a
//! print-capable viewer, or routing through the system default-handler
//! print action. New strategies plug in behind [`PrintStrategy`] without
//! touching the pipeline.

use crate::spooler::Spooler;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Time granted to a spawned viewer to parse the document and hand the
/// job to the spooler before the pipeline proceeds.
pub const VIEWER_GRACE: Duration = Duration::from_secs(5);

/// A single capability: print one file to one named printer.
#[async_trait]
pub trait PrintStrategy: Send + Sync {
    async fn print(&self, path: &Path, printer: &str) -> Result<()>;
}

/// Spawns a print-capable viewer with print-to-printer-and-exit
/// arguments and does not wait for it.
///
/// Fire-and-forget: the spooler's acceptance of the job is not
/// observable, only that the launch worked. The grace sleep is the only
/// synchronization with the viewer.
pub struct ViewerStrategy {
    viewer: PathBuf,
    grace: Duration,
}

impl ViewerStrategy {
    pub fn new(viewer: PathBuf) -> Self {
        Self {
            viewer,
            grace: VIEWER_GRACE,
        }
    }

    /// Override the post-launch grace (tests use a short one).
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }
}

#[async_trait]
impl PrintStrategy for ViewerStrategy {
    async fn print(&self, path: &Path, printer: &str) -> Result<()> {
        if !self.viewer.is_file() {
            bail!("viewer executable not found: {}", self.viewer.display());
        }

        info!(
            "Printing with viewer: {} to {}",
            path.display(),
            printer
        );

        // /t = print to the named printer and exit
        Command::new(&self.viewer)
            .arg("/t")
            .arg(path)
            .arg(printer)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| {
                format!("Failed to spawn viewer {}", self.viewer.display())
            })?;

        tokio::time::sleep(self.grace).await;

        info!("Print job sent via viewer: {}", path.display());
        Ok(())
    }
}

/// Routes through the OS print action for the file type.
///
/// The system default printer is swapped to the target for the duration
/// of the action and restored afterwards, even when the action itself
/// failed. The swap window is serialized so concurrent dispatches cannot
/// leak a temporary default into each other's print action.
pub struct SystemStrategy {
    spooler: Arc<dyn Spooler>,
    swap_lock: Mutex<()>,
}

impl SystemStrategy {
    pub fn new(spooler: Arc<dyn Spooler>) -> Self {
        Self {
            spooler,
            swap_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl PrintStrategy for SystemStrategy {
    async fn print(&self, path: &Path, printer: &str) -> Result<()> {
        let _guard = self.swap_lock.lock().await;

        info!(
            "Printing via system print action: {} to {}",
            path.display(),
            printer
        );

        let original = self.spooler.default_printer().await?;

        self.spooler.set_default_printer(printer).await?;

        let action = self.spooler.print_action(path).await;

        // Restore the previous default even when the action failed.
        // Restoration failure is logged, never propagated.
        if let Some(original) = original.filter(|o| o.as_str() != printer) {
            if let Err(e) = self.spooler.set_default_printer(&original).await {
                warn!("Failed to restore default printer {}: {:#}", original, e);
            }
        }

        action?;
        info!("Print job sent: {}", path.display());
        Ok(())
    }
}
