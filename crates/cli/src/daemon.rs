//! Daemon loop
//!
//! Loads and validates configuration, drains the startup scan, then
//! feeds live arrivals to the pipeline until Ctrl-C. Files are processed
//! one at a time; a slow print delays the next arrival by design.

use anyhow::{Context, Result};
use ds_core::{ArrivalPipeline, Config};
use spool::{CupsSpooler, Dispatcher};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use watcher::ArrivalWatcher;

pub async fn run(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path).context("Failed to load configuration")?;

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        // Show what the spooler actually has before bailing, so the
        // operator can correct the config in one pass.
        let _ = crate::printers::list().await;
        return Err(e.into());
    }

    info!("Watch folder: {}", config.watch_folder.display());
    info!(
        "Printer: {}",
        if config.printer_name.is_empty() {
            "(default)"
        } else {
            config.printer_name.as_str()
        }
    );
    info!("File types: {:?}", config.file_extensions);

    let config = Arc::new(config);
    let spooler = Arc::new(CupsSpooler);
    let dispatcher = Arc::new(Dispatcher::from_config(&config, spooler));
    let pipeline = ArrivalPipeline::new(config.clone(), dispatcher);

    // Files already waiting in the folder go through the same sequence
    // before live events are consumed.
    pipeline.scan_existing().await?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _watch = ArrivalWatcher::start(&config.watch_folder, tx)?;

    info!("Watching folder: {}", config.watch_folder.display());
    info!("Press Ctrl+C to stop...");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut idle = tokio::time::interval(config.check_interval());
    idle.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Stopping...");
                break;
            }
            arrival = rx.recv() => {
                match arrival {
                    Some(path) => {
                        info!("New file detected: {}", path.display());
                        pipeline.process(&path).await;
                    }
                    None => break,
                }
            }
            _ = idle.tick() => {
                debug!("Idle; watching {}", config.watch_folder.display());
            }
        }
    }

    info!("Stopped.");
    Ok(())
}
