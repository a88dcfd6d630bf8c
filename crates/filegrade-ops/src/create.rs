//! Marker file creation.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use filegrade_scan::basename;

use crate::operation::{ActionKind, OperationError, run_blocking};

/// Path of the marker file for a directory: `<dir>/<basename>_file.txt`.
pub fn marker_path(dir: &Path) -> PathBuf {
    dir.join(format!("{}_file.txt", basename(dir)))
}

/// Create (or overwrite) the marker file inside `dir`.
pub async fn create_marker(dir: &Path, content: String) -> Result<PathBuf, OperationError> {
    let path = marker_path(dir);

    let path_clone = path.clone();
    run_blocking(ActionKind::CreateMarker, path.clone(), move || {
        fs::write(&path_clone, content)
    })
    .await?;

    debug!(path = %path.display(), "created marker file");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_marker_path() {
        assert_eq!(
            marker_path(Path::new("work/project")),
            PathBuf::from("work/project/project_file.txt")
        );
        assert_eq!(marker_path(Path::new("solo")), PathBuf::from("solo/solo_file.txt"));
    }

    #[tokio::test]
    async fn test_create_marker_name_too_long() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("d".repeat(250));
        fs::create_dir(&dir).unwrap();

        let err = create_marker(&dir, String::new()).await.unwrap_err();
        assert_eq!(err.action, ActionKind::CreateMarker);
        assert!(!dir.join(format!("{}_file.txt", "d".repeat(250))).exists());
    }

    #[tokio::test]
    async fn test_create_marker() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("box");
        fs::create_dir(&dir).unwrap();

        let path = create_marker(&dir, "hello\n".to_string()).await.unwrap();
        assert_eq!(path, dir.join("box_file.txt"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[tokio::test]
    async fn test_create_marker_missing_dir() {
        let temp = TempDir::new().unwrap();
        let err = create_marker(&temp.path().join("gone"), String::new())
            .await
            .unwrap_err();
        assert_eq!(err.action, ActionKind::CreateMarker);
    }
}
