//! Errors raised before a worker starts.

use std::path::PathBuf;

use thiserror::Error;

use filegrade_core::{OptionError, ResolutionError};

/// Why a command-line target never got a worker.
#[derive(Debug, Error)]
pub enum TargetError {
    /// The path does not exist or is not a file, directory or symlink.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// The option string could not be parsed.
    #[error(transparent)]
    Option(#[from] OptionError),
}

/// A target skipped during preparation.
#[derive(Debug)]
pub struct TargetFailure {
    /// Path as given on the command line.
    pub path: PathBuf,
    /// What went wrong.
    pub error: TargetError,
}

impl std::fmt::Display for TargetFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.error)
    }
}

/// A worker could not be spawned.
#[derive(Debug, Error)]
pub enum SpawnError {
    /// No tokio runtime is available on this thread.
    #[error("No async runtime available to spawn worker for {path}")]
    NoRuntime { path: PathBuf },
}
