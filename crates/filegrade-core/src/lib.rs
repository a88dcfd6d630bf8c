//! Core types and traits for filegrade.
//!
//! This crate provides the data model shared by every other filegrade crate:
//! target specifications and their option flags, inspection reports, the
//! error taxonomy, configuration, and the diagnostic classifier that turns
//! compiler output into a score.

mod config;
mod diagnostic;
mod error;
mod report;
mod target;

pub use config::{InspectConfig, InspectConfigBuilder};
pub use diagnostic::{DiagnosticRecord, classify, score};
pub use error::{FieldError, OptionError, ResolutionError, SubprocessSpawnError};
pub use report::{
    ActionOutcome, DELIMITER, ExitKind, InspectionReport, TypeCount, format_permissions,
};
pub use target::{EntityKind, Flag, Options, TargetSpec};
