//! Print dispatcher
//!
//! The single entry point the pipeline uses to print. Checks
//! preconditions, resolves the target printer, invokes the configured
//! strategy, and converts every failure into a logged `false` so the
//! pipeline only ever sees a boolean.

use crate::spooler::Spooler;
use crate::strategy::{PrintStrategy, SystemStrategy, ViewerStrategy};
use async_trait::async_trait;
use ds_core::config::{Config, PrintMethod};
use ds_core::pipeline::PrintDispatch;
use std::path::Path;
use std::sync::Arc;
use tracing::error;

/// Dispatches ready files to the configured print strategy.
pub struct Dispatcher {
    printer_name: String,
    strategy: Arc<dyn PrintStrategy>,
    spooler: Arc<dyn Spooler>,
}

impl Dispatcher {
    /// Build the dispatcher the configuration asks for.
    pub fn from_config(config: &Config, spooler: Arc<dyn Spooler>) -> Self {
        let strategy: Arc<dyn PrintStrategy> = match config.print_method {
            PrintMethod::Acrobat => {
                Arc::new(ViewerStrategy::new(config.acrobat_path.clone()))
            }
            PrintMethod::Shellexecute => Arc::new(SystemStrategy::new(spooler.clone())),
        };

        Self {
            printer_name: config.printer_name.clone(),
            strategy,
            spooler,
        }
    }

    /// Assemble from parts; used by tests and by callers that want a
    /// non-default strategy.
    pub fn new(
        printer_name: String,
        strategy: Arc<dyn PrintStrategy>,
        spooler: Arc<dyn Spooler>,
    ) -> Self {
        Self {
            printer_name,
            strategy,
            spooler,
        }
    }

    /// Configured printer, or the system default when none is set.
    async fn resolve_printer(&self) -> Option<String> {
        if !self.printer_name.is_empty() {
            return Some(self.printer_name.clone());
        }

        match self.spooler.default_printer().await {
            Ok(Some(name)) => Some(name),
            Ok(None) => {
                error!("No printer available");
                None
            }
            Err(e) => {
                error!("Error getting default printer: {:#}", e);
                None
            }
        }
    }
}

#[async_trait]
impl PrintDispatch for Dispatcher {
    async fn print(&self, path: &Path) -> bool {
        if !path.exists() {
            error!("File not found: {}", path.display());
            return false;
        }

        let Some(printer) = self.resolve_printer().await else {
            return false;
        };

        match self.strategy.print(path, &printer).await {
            Ok(()) => true,
            Err(e) => {
                error!("Error printing {}: {:#}", path.display(), e);
                false
            }
        }
    }
}
