//! Logging setup
//!
//! Everything the daemon reports goes to two places: stderr for an
//! attended run, and an append-only `dropspool.log` next to the working
//! directory for unattended operation.

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;

pub fn init() -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::never(".", "dropspool.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(std::io::stderr.and(file_writer))
        .init();

    Ok(guard)
}
