//! Read-only metadata helpers for filegrade.
//!
//! Every function here inspects the filesystem without modifying it:
//!
//! - **Classification** of a path into an [`EntityKind`] without following
//!   symlinks
//! - **Directory size** via a physical jwalk traversal
//! - **Per-entry metadata**: permission bits, hard-link count, modification
//!   time, line count, `.c` child count and symlink target size
//!
//! # Example
//!
//! ```rust,no_run
//! use filegrade_scan::{directory_size, resolve_kind};
//!
//! let kind = resolve_kind("/path/to/dir").unwrap();
//! let bytes = directory_size("/path/to/dir").unwrap();
//! println!("{kind}: {bytes} bytes");
//! ```

mod entity;
mod metadata;
mod size;

pub use entity::{basename, resolve_kind};
pub use metadata::{
    c_file_count, count_lines, hard_link_count, modified_time, permission_bits,
    symlink_target_size,
};
pub use size::directory_size;

// Re-export core types for convenience
pub use filegrade_core::{EntityKind, ResolutionError};
