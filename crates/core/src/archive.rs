//! Post-print resolution: delete or archive a printed file
//!
//! Runs only after a successful print. Failures here are logged and never
//! retried; re-running this step would mean re-entering the pipeline and
//! risking a duplicate print, so a stuck file is a cleanup problem for the
//! operator, not a print problem.

use crate::config::Config;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::Path;
use tracing::{info, warn};

/// Apply the retention policy to a successfully printed file.
///
/// Delete wins over move; with neither flag set the file stays in place
/// and only the claim set keeps it from being reprocessed.
pub fn resolve(path: &Path, config: &Config) {
    let result = if config.delete_after_print {
        delete(path)
    } else if config.move_after_print {
        archive(path, config, Local::now())
    } else {
        Ok(())
    };

    if let Err(e) = result {
        warn!("Error handling file after print: {:#}", e);
    }
}

fn delete(path: &Path) -> Result<()> {
    std::fs::remove_file(path)
        .with_context(|| format!("Failed to delete {}", path.display()))?;
    info!("Deleted after printing: {}", path.display());
    Ok(())
}

fn archive(path: &Path, config: &Config, when: DateTime<Local>) -> Result<()> {
    let archive_dir = config.archive_dir();
    std::fs::create_dir_all(&archive_dir).with_context(|| {
        format!("Failed to create archive folder {}", archive_dir.display())
    })?;

    let target = archive_dir.join(archive_name(path, when));
    move_file(path, &target)?;

    info!("Moved to: {}", target.display());
    Ok(())
}

/// Archived filename: the original stem with a second-resolution timestamp
/// suffix, so same-named files printed at different seconds never collide.
pub fn archive_name(path: &Path, when: DateTime<Local>) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    format!("{stem}_{}{ext}", when.format("%Y%m%d_%H%M%S"))
}

/// Rename, falling back to copy-then-remove when the archive directory
/// sits on a different filesystem.
fn move_file(from: &Path, to: &Path) -> Result<()> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }

    std::fs::copy(from, to)
        .with_context(|| format!("Failed to copy {} to {}", from.display(), to.display()))?;
    std::fs::remove_file(from)
        .with_context(|| format!("Failed to remove {} after copy", from.display()))?;
    Ok(())
}
