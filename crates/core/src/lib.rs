//! Core pipeline for Dropspool
//!
//! Everything between "a file appeared in the watch folder" and "the file
//! was printed and archived" lives here: the readiness prober that decides
//! when a file is safe to touch, the claim set that prevents duplicate
//! printing, the post-print resolver, and the arrival pipeline that
//! sequences them. Actual print submission is behind the [`PrintDispatch`]
//! trait so the pipeline never depends on a concrete spooler.

pub mod archive;
pub mod claims;
pub mod config;
pub mod pipeline;
pub mod readiness;

pub use claims::ClaimSet;
pub use config::{Config, ConfigError, PrintMethod};
pub use pipeline::{ArrivalPipeline, Outcome, PrintDispatch};
pub use readiness::ReadinessProbe;
