//! Append-only score log sinks.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Destination for `<name>: <score>` lines.
///
/// Implementations must append, never truncate, and must write each line
/// in one piece so concurrent writers cannot interleave within a line.
pub trait ScoreSink: Send + Sync {
    /// Append one score line.
    fn append(&self, name: &str, score: u8) -> io::Result<()>;
}

/// Format a score line, including its newline.
fn score_line(name: &str, score: u8) -> String {
    format!("{name}: {score}\n")
}

/// Score log backed by a file opened in append mode.
///
/// The file is reopened for every line and written with a single
/// `write_all`; with `O_APPEND` the kernel positions each write at the
/// current end of file, so lines from concurrent workers do not clobber
/// each other.
#[derive(Debug, Clone)]
pub struct FileScoreLog {
    path: PathBuf,
}

impl FileScoreLog {
    /// Create a sink appending to `path`. The file is created on first use.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreSink for FileScoreLog {
    fn append(&self, name: &str, score: u8) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(score_line(name, score).as_bytes())
    }
}

/// In-memory score log for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryScoreLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryScoreLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines appended so far, without newlines.
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ScoreSink for MemoryScoreLog {
    fn append(&self, name: &str, score: u8) -> io::Result<()> {
        let line = score_line(name, score).trim_end().to_string();
        match self.lines.lock() {
            Ok(mut lines) => lines.push(line),
            Err(poisoned) => poisoned.into_inner().push(line),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_log_appends() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("grades.txt");
        std::fs::write(&path, "old entry, any format\n").unwrap();

        let log = FileScoreLog::new(&path);
        log.append("a.c", 10).unwrap();
        log.append("b.c", 1).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "old entry, any format\na.c: 10\nb.c: 1\n"
        );
    }

    #[test]
    fn test_file_log_creates_file() {
        let temp = TempDir::new().unwrap();
        let log = FileScoreLog::new(temp.path().join("new.txt"));
        log.append("x.c", 7).unwrap();
        assert_eq!(std::fs::read_to_string(log.path()).unwrap(), "x.c: 7\n");
    }

    #[test]
    fn test_memory_log() {
        let log = MemoryScoreLog::new();
        log.append("x.c", 7).unwrap();
        assert_eq!(log.lines(), vec!["x.c: 7".to_string()]);
    }
}
