//! System spooler access
//!
//! Printer enumeration, default-printer state, and the generic print
//! action all go through the host spooler's command line tools. The
//! trait exists so strategies and tests can substitute a mock instead of
//! touching real system state.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// A printer known to the system spooler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Printer {
    pub name: String,
    pub is_default: bool,
}

/// The process-wide print subsystem.
///
/// The default printer is shared mutable state for the whole host;
/// callers that swap it are responsible for restoring it.
#[async_trait]
pub trait Spooler: Send + Sync {
    /// Enumerate printers known to the system.
    async fn list_printers(&self) -> Result<Vec<Printer>>;

    /// Name of the current system default printer, if one is set.
    async fn default_printer(&self) -> Result<Option<String>>;

    /// Make `name` the system default printer.
    async fn set_default_printer(&self, name: &str) -> Result<()>;

    /// Submit `path` through the print action registered for its file
    /// type; the job goes to the current default printer.
    async fn print_action(&self, path: &Path) -> Result<()>;
}

/// Spooler backed by the CUPS command line tools (`lpstat`, `lpoptions`,
/// `lp`).
#[derive(Debug, Default)]
pub struct CupsSpooler;

#[async_trait]
impl Spooler for CupsSpooler {
    async fn list_printers(&self) -> Result<Vec<Printer>> {
        let output = Command::new("lpstat")
            .arg("-p")
            .output()
            .await
            .context("Failed to run lpstat -p")?;

        // lpstat -p exits non-zero when no destinations exist at all
        if !output.status.success() {
            return Ok(Vec::new());
        }

        let default = self.default_printer().await.unwrap_or(None);
        let stdout = String::from_utf8_lossy(&output.stdout);

        Ok(parse_printer_names(&stdout)
            .into_iter()
            .map(|name| Printer {
                is_default: Some(name.as_str()) == default.as_deref(),
                name,
            })
            .collect())
    }

    async fn default_printer(&self) -> Result<Option<String>> {
        let output = Command::new("lpstat")
            .arg("-d")
            .output()
            .await
            .context("Failed to run lpstat -d")?;

        if !output.status.success() {
            bail!("lpstat -d exited with {}", output.status);
        }

        Ok(parse_default_destination(&String::from_utf8_lossy(
            &output.stdout,
        )))
    }

    async fn set_default_printer(&self, name: &str) -> Result<()> {
        let output = Command::new("lpoptions")
            .arg("-d")
            .arg(name)
            .output()
            .await
            .context("Failed to run lpoptions")?;

        if !output.status.success() {
            bail!(
                "lpoptions -d {} exited with {}: {}",
                name,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(())
    }

    async fn print_action(&self, path: &Path) -> Result<()> {
        let output = Command::new("lp")
            .arg(path)
            .output()
            .await
            .context("Failed to run lp")?;

        if !output.status.success() {
            bail!(
                "lp {} exited with {}: {}",
                path.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        debug!(
            "Spooler accepted job: {}",
            String::from_utf8_lossy(&output.stdout).trim()
        );
        Ok(())
    }
}

/// Pull printer names out of `lpstat -p` output.
///
/// Lines look like `printer Office_Laser is idle.  enabled since ...`.
fn parse_printer_names(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| line.strip_prefix("printer "))
        .filter_map(|rest| rest.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// Pull the default destination out of `lpstat -d` output.
///
/// Either `system default destination: <name>` or
/// `no system default destination`.
fn parse_default_destination(stdout: &str) -> Option<String> {
    stdout.lines().find_map(|line| {
        line.strip_prefix("system default destination: ")
            .map(|name| name.trim().to_string())
    })
}
