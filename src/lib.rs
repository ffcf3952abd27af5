//! Core library for mailvet, a bulk email list validation tool.
//!
//! The validation chain combines syntax checking, DNS/MX resolution, SMTP
//! mailbox probing, optional SMTP authentication, geolocation inference and
//! spam-trap heuristics into a single classified result per input record.
//! Batches run concurrently with resumable progress tracking.

pub mod core;
pub mod pipeline;
pub mod runner;
pub mod utils;

pub use crate::core::config::{Config, ConfigBuilder, ConfigFile, PolicyChoice};
pub use crate::core::error::{AppError, Result};
pub use crate::core::models::{
    AuthOutcome, DomainReport, Identifier, InputRecord, MxHost, SpamRisk, ValidationResult,
    ValidationStatus,
};
pub use crate::pipeline::Pipeline;
pub use crate::runner::progress::{ProgressTracker, TaggedResult};
pub use crate::runner::report::ReportWriter;
pub use crate::runner::{BatchRunner, RunSummary};
pub use crate::utils::proxy::ProxyRotator;
