//! Recursive directory size using jwalk.

use std::path::Path;

use jwalk::{Parallelism, WalkDir};
use tracing::warn;

use filegrade_core::ResolutionError;

/// Total size in bytes of every regular file beneath `root`.
///
/// The walk is physical: symlinks are reported as links and never followed,
/// and the process working directory is left alone. Entries that cannot be
/// read are skipped with a warning rather than failing the whole sum.
pub fn directory_size(root: impl AsRef<Path>) -> Result<u64, ResolutionError> {
    let root = root.as_ref();
    std::fs::symlink_metadata(root).map_err(|e| ResolutionError::io(root, e))?;

    let walker = WalkDir::new(root)
        .parallelism(Parallelism::Serial)
        .skip_hidden(false)
        .follow_links(false)
        .min_depth(1);

    let mut total: u64 = 0;
    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                warn!(path = ?err.path(), "skipping unreadable entry: {err}");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        match entry.metadata() {
            Ok(metadata) => total += metadata.len(),
            Err(err) => warn!(path = %entry.path().display(), "metadata error: {err}"),
        }
    }

    Ok(total)
}
