//! Action kinds and their errors.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The mutating action applied to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    CreateMarker,
    ChangePermissions,
    CreateLink,
    DeleteLink,
    Compile,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateMarker => write!(f, "create marker file"),
            Self::ChangePermissions => write!(f, "change permissions"),
            Self::CreateLink => write!(f, "create symbolic link"),
            Self::DeleteLink => write!(f, "delete symbolic link"),
            Self::Compile => write!(f, "compile"),
        }
    }
}

/// An error that occurred during a file action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationError {
    /// The action that failed.
    pub action: ActionKind,
    /// The path that caused the error.
    pub path: PathBuf,
    /// A human-readable error message.
    pub message: String,
}

impl OperationError {
    /// Create a new operation error.
    pub fn new(action: ActionKind, path: PathBuf, message: impl Into<String>) -> Self {
        Self {
            action,
            path,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for OperationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

impl std::error::Error for OperationError {}

/// Run a blocking filesystem call on the blocking pool.
pub(crate) async fn run_blocking<T, F>(
    action: ActionKind,
    path: PathBuf,
    f: F,
) -> Result<T, OperationError>
where
    F: FnOnce() -> std::io::Result<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(OperationError::new(action, path, format!("Failed to {action}: {e}"))),
        Err(e) => Err(OperationError::new(action, path, format!("Task failed: {e}"))),
    }
}
