//! Dropspool - automatic printing for a watched folder

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod daemon;
mod logging;
mod printers;

/// Watch a folder for new PDF files and route them to a printer.
#[derive(Parser)]
#[command(name = "dropspool")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// List available printers and exit
    #[arg(short = 'l', long)]
    list_printers: bool,

    /// Path to the configuration file
    #[arg(default_value = "config.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The guard keeps the file appender flushing until exit
    let _log_guard = logging::init()?;

    if cli.list_printers {
        return printers::list().await;
    }

    daemon::run(&cli.config).await
}
