//! Printer listing
//!
//! `dropspool --list-printers` prints what the spooler knows so the
//! operator can copy a name into the config file.

use anyhow::Result;
use owo_colors::OwoColorize;
use spool::{CupsSpooler, Spooler};

pub async fn list() -> Result<()> {
    let spooler = CupsSpooler;
    let printers = spooler.list_printers().await?;

    println!("\n{}", "Available Printers".bold());

    if printers.is_empty() {
        println!("No printers found.");
        return Ok(());
    }

    for printer in &printers {
        if printer.is_default {
            println!("  {} {} {}", "*".green(), printer.name, "(default)".dimmed());
        } else {
            println!("    {}", printer.name);
        }
    }

    println!("\nCopy the printer name into your config file.");
    println!("Leave 'printer_name' empty to use the default printer.");
    Ok(())
}
