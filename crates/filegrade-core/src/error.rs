//! Error types for inspection and compilation.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::target::EntityKind;

/// Errors raised while resolving a target path to an entity.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Entity is neither a file, a directory nor a symlink.
    #[error("Unsupported entity kind at {path}")]
    Unsupported { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ResolutionError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Errors raised while parsing an option string for a target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    /// Option string does not begin with `-`.
    #[error("Options must start with '-', got {input:?}")]
    MissingDash { input: String },

    /// Option string is a bare `-`.
    #[error("No option flags given")]
    Empty,

    /// Flag character is unknown or not valid for this kind of entity.
    #[error("Invalid option '{flag}' for {kind}")]
    InvalidFlag { flag: char, kind: EntityKind },

    /// `-l` on a regular file was not followed by a link name.
    #[error("Option 'l' requires a link name")]
    MissingLinkName,

    /// No options were supplied and prompting is disabled.
    #[error("No options supplied for {path}")]
    MissingOptions { path: PathBuf },
}

/// Failure to start one of the pipeline's subprocesses.
#[derive(Debug, Error)]
#[error("Failed to spawn {step}: {source}")]
pub struct SubprocessSpawnError {
    /// Pipeline step that failed (`compiler`, `filter`, `pipe`).
    pub step: &'static str,
    #[source]
    pub source: std::io::Error,
}

impl SubprocessSpawnError {
    /// Create a spawn error for a named step.
    pub fn new(step: &'static str, source: std::io::Error) -> Self {
        Self { step, source }
    }
}

/// A requested report field that could not be gathered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the field, as shown in the report.
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

impl FieldError {
    /// Create a new field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_error_io() {
        let err = ResolutionError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(matches!(err, ResolutionError::NotFound { .. }));
    }

    #[test]
    fn test_option_error_names_flag() {
        let err = OptionError::InvalidFlag {
            flag: 'z',
            kind: EntityKind::Directory,
        };
        assert_eq!(err.to_string(), "Invalid option 'z' for directory");
    }

    #[test]
    fn test_spawn_error_names_step() {
        let err = SubprocessSpawnError::new(
            "compiler",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        assert!(err.to_string().starts_with("Failed to spawn compiler"));
    }
}
