//! Mutating file actions for filegrade.
//!
//! Each inspected entity receives at most one of these actions. All of them
//! run their blocking filesystem calls on tokio's blocking pool and report
//! failures as [`OperationError`] values carrying the offending path.

mod create;
mod link;
mod operation;
mod permissions;

pub use create::{create_marker, marker_path};
pub use link::{create_symlink, delete_symlink};
pub use operation::{ActionKind, OperationError};
pub use permissions::set_permissions;
