//! Symbolic link creation and removal.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::operation::{ActionKind, OperationError, run_blocking};

/// Create a symlink named `link` pointing at `original`.
///
/// The link stores the absolute path of `original` so it resolves no matter
/// which directory it is created in. An existing entry at `link` is never
/// replaced.
pub async fn create_symlink(original: &Path, link: &Path) -> Result<PathBuf, OperationError> {
    let link = link.to_path_buf();

    if link.as_os_str().is_empty() {
        return Err(OperationError::new(
            ActionKind::CreateLink,
            link,
            "Link name cannot be empty",
        ));
    }

    if fs::symlink_metadata(&link).is_ok() {
        return Err(OperationError::new(
            ActionKind::CreateLink,
            link,
            "File already exists",
        ));
    }

    let original = original.to_path_buf();
    let link_clone = link.clone();
    run_blocking(ActionKind::CreateLink, link.clone(), move || {
        let target = fs::canonicalize(&original)?;
        make_symlink(&target, &link_clone)
    })
    .await?;

    debug!(link = %link.display(), "created symbolic link");
    Ok(link)
}

/// Remove a symlink. Refuses to remove anything that is not a link.
pub async fn delete_symlink(link: &Path) -> Result<(), OperationError> {
    let link_buf = link.to_path_buf();
    run_blocking(ActionKind::DeleteLink, link.to_path_buf(), move || {
        let metadata = fs::symlink_metadata(&link_buf)?;
        if !metadata.file_type().is_symlink() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a symbolic link"));
        }
        fs::remove_file(&link_buf)
    })
    .await?;

    debug!(link = %link.display(), "deleted symbolic link");
    Ok(())
}

#[cfg(unix)]
fn make_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn make_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}
