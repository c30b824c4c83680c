//! Configuration loading and validation
//!
//! The configuration lives in a JSON file (`config.json` by default).
//! Missing keys fall back to defaults; a missing file is replaced with a
//! default one so the operator has something concrete to edit.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Known install locations for a print-capable PDF viewer, tried in order
/// when `acrobat_path` is left blank.
const VIEWER_CANDIDATES: &[&str] = &[
    // Acrobat DC (paid version)
    r"C:\Program Files\Adobe\Acrobat DC\Acrobat\Acrobat.exe",
    r"C:\Program Files (x86)\Adobe\Acrobat DC\Acrobat\Acrobat.exe",
    // Acrobat Reader DC (free version)
    r"C:\Program Files\Adobe\Acrobat Reader DC\Reader\AcroRd32.exe",
    r"C:\Program Files (x86)\Adobe\Acrobat Reader DC\Reader\AcroRd32.exe",
    // Older versions
    r"C:\Program Files\Adobe\Reader 11.0\Reader\AcroRd32.exe",
    r"C:\Program Files (x86)\Adobe\Reader 11.0\Reader\AcroRd32.exe",
];

/// How a ready file gets handed to the printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintMethod {
    /// Spawn the configured viewer executable with print-and-exit arguments.
    Acrobat,
    /// Route through the OS print action for the file type.
    Shellexecute,
}

/// Configuration errors are fatal at startup; the process never enters
/// the watch loop with a broken config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0} (a default was created; edit it and restart)")]
    MissingCreated(PathBuf),

    #[error("failed to read configuration file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration file {path} contains invalid JSON")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("watch folder is not configured")]
    WatchFolderUnset,

    #[error("watch folder does not exist: {0}")]
    WatchFolderMissing(PathBuf),

    #[error("viewer executable not found: {0} (set 'acrobat_path' or use 'print_method': 'shellexecute')")]
    ViewerMissing(PathBuf),
}

/// Application configuration, consumed read-only by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory to watch for arriving files. Must exist.
    pub watch_folder: PathBuf,
    /// Target printer; empty means the system default.
    pub printer_name: String,
    /// Idle cadence of the outer daemon loop, in seconds.
    pub check_interval_seconds: u64,
    /// Remove the file after a successful print.
    pub delete_after_print: bool,
    /// Archive the file after a successful print (delete wins when both set).
    pub move_after_print: bool,
    /// Archive subdirectory name, relative to the watch folder.
    pub printed_folder: String,
    /// Recognized extensions, matched case-insensitively (e.g. ".pdf").
    pub file_extensions: Vec<String>,
    /// Settle delay between readiness and the print attempt, in seconds.
    pub print_delay_seconds: u64,
    /// Wait between the print attempt and the move/delete, in seconds.
    pub move_delete_delay_seconds: u64,
    /// Print strategy selector.
    pub print_method: PrintMethod,
    /// Viewer executable for the acrobat method; auto-discovered when blank.
    pub acrobat_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watch_folder: PathBuf::new(),
            printer_name: String::new(),
            check_interval_seconds: 1,
            delete_after_print: false,
            move_after_print: true,
            printed_folder: "printed".to_string(),
            file_extensions: vec![".pdf".to_string()],
            print_delay_seconds: 2,
            move_delete_delay_seconds: 60,
            print_method: PrintMethod::Acrobat,
            acrobat_path: PathBuf::new(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// A missing file is replaced with a default one and reported as an
    /// error so the operator edits it before the next start.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::write_default(path)?;
            return Err(ConfigError::MissingCreated(path.to_path_buf()));
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config: Config =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        if config.acrobat_path.as_os_str().is_empty() {
            if let Some(found) = discover_viewer() {
                info!("Auto-detected PDF viewer at: {}", found.display());
                config.acrobat_path = found;
            }
        }

        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Write a default configuration file for the operator to edit.
    fn write_default(path: &Path) -> Result<(), ConfigError> {
        let pretty =
            serde_json::to_string_pretty(&Config::default()).map_err(|source| {
                ConfigError::Json {
                    path: path.to_path_buf(),
                    source,
                }
            })?;

        std::fs::write(path, pretty).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Default configuration created: {}", path.display());
        Ok(())
    }

    /// Validate the loaded configuration. Errors here abort startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watch_folder.as_os_str().is_empty() {
            return Err(ConfigError::WatchFolderUnset);
        }

        if !self.watch_folder.is_dir() {
            return Err(ConfigError::WatchFolderMissing(self.watch_folder.clone()));
        }

        if self.printer_name.is_empty() {
            warn!("No printer configured. Will use default printer.");
        }

        if self.print_method == PrintMethod::Acrobat && !self.acrobat_path.is_file() {
            return Err(ConfigError::ViewerMissing(self.acrobat_path.clone()));
        }

        Ok(())
    }

    /// Whether the file's extension is in the recognized set.
    pub fn matches_extension(&self, path: &Path) -> bool {
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!(".{}", ext.to_ascii_lowercase()),
            None => return false,
        };

        self.file_extensions
            .iter()
            .any(|e| e.to_ascii_lowercase() == ext)
    }

    /// Archive directory for printed files.
    pub fn archive_dir(&self) -> PathBuf {
        self.watch_folder.join(&self.printed_folder)
    }

    /// Settle delay between readiness and the print attempt.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.print_delay_seconds)
    }

    /// Wait between the print attempt and the move/delete.
    pub fn post_print_delay(&self) -> Duration {
        Duration::from_secs(self.move_delete_delay_seconds)
    }

    /// Idle cadence of the outer daemon loop.
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_seconds.max(1))
    }
}

/// Probe the known viewer install locations.
fn discover_viewer() -> Option<PathBuf> {
    VIEWER_CANDIDATES
        .iter()
        .map(Path::new)
        .find(|p| p.is_file())
        .map(Path::to_path_buf)
}
