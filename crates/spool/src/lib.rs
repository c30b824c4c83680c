//! Print dispatch for Dropspool
//!
//! This crate owns everything that touches the system print subsystem:
//! - The [`Spooler`] trait over the host spooler tools (enumerate
//!   printers, query/set the default, submit a print action)
//! - The two interchangeable [`PrintStrategy`] implementations
//! - The [`Dispatcher`] the pipeline calls, which checks preconditions,
//!   resolves the target printer, and converts every failure into a
//!   logged `false`

pub mod dispatcher;
pub mod spooler;
pub mod strategy;

pub use dispatcher::Dispatcher;
pub use spooler::{CupsSpooler, Printer, Spooler};
pub use strategy::{PrintStrategy, SystemStrategy, ViewerStrategy};
