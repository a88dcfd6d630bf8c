//! Entity classification and naming.

use std::fs::FileType;
use std::path::Path;

use compact_str::CompactString;

use filegrade_core::{EntityKind, ResolutionError};

/// Determine the kind of entity at `path` without following symlinks.
pub fn resolve_kind(path: impl AsRef<Path>) -> Result<EntityKind, ResolutionError> {
    let path = path.as_ref();
    let metadata = std::fs::symlink_metadata(path).map_err(|e| ResolutionError::io(path, e))?;
    Ok(kind_of(metadata.file_type()))
}

fn kind_of(file_type: FileType) -> EntityKind {
    if file_type.is_symlink() {
        EntityKind::Symlink
    } else if file_type.is_dir() {
        EntityKind::Directory
    } else if file_type.is_file() {
        EntityKind::File
    } else {
        EntityKind::Other
    }
}

/// Last component of a path, split on the rightmost `/`.
///
/// Returns the whole path if it has no separator. Trailing separators are
/// ignored so `dir/` names `dir`.
pub fn basename(path: impl AsRef<Path>) -> CompactString {
    let raw = path.as_ref().to_string_lossy();
    let text = match raw.trim_end_matches('/') {
        "" => &*raw,
        trimmed => trimmed,
    };
    match text.rsplit_once('/') {
        Some((_, name)) => CompactString::new(name),
        None => CompactString::new(text),
    }
}
