//! Permission changes.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::operation::{ActionKind, OperationError, run_blocking};

/// Set the permission bits of `path` to `mode`.
///
/// On a symlink this changes the file the link resolves to, since most
/// platforms keep no mode on the link itself. A dangling link therefore
/// fails with the target's `NotFound` error.
pub async fn set_permissions(path: &Path, mode: u32) -> Result<u32, OperationError> {
    let path_buf = path.to_path_buf();
    run_blocking(ActionKind::ChangePermissions, path.to_path_buf(), move || {
        apply_mode(&path_buf, mode)
    })
    .await?;

    debug!(path = %path.display(), mode = %format!("{mode:03o}"), "changed permissions");
    Ok(mode)
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn apply_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    // Only the owner write bit maps onto the readonly flag
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_readonly(mode & 0o200 == 0);
    fs::set_permissions(path, perms)
}
