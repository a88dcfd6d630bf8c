//! Inspection reports and their text rendering.

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use compact_str::CompactString;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::FieldError;
use crate::target::EntityKind;

/// Delimiter line that opens and closes every rendered report.
pub const DELIMITER: &str = "------------------------------------------";

/// How a subprocess terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitKind {
    /// Normal termination with an exit code.
    Code(i32),
    /// Killed by a signal.
    Signal(i32),
    /// Status could not be determined.
    Unknown,
}

impl ExitKind {
    /// Whether the process exited normally with status 0.
    pub fn is_success(&self) -> bool {
        matches!(self, ExitKind::Code(0))
    }

    /// Whether the process was terminated by a signal.
    pub fn is_signal(&self) -> bool {
        matches!(self, ExitKind::Signal(_))
    }
}

impl std::fmt::Display for ExitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Code(code) => write!(f, "exited with code {code}"),
            Self::Signal(signal) => write!(f, "terminated by signal {signal}"),
            Self::Unknown => write!(f, "terminated abnormally"),
        }
    }
}

/// Kind-specific count carried by a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeCount {
    /// Hard links to a regular file.
    HardLinks(u64),
    /// Immediate `.c` children of a directory.
    CFiles(u64),
    /// Lines in a regular file.
    Lines(u64),
    /// Size in bytes of a symlink's target.
    TargetSize(u64),
}

/// Result of the one mutating action a worker performs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionOutcome {
    /// No action applied to this target.
    #[default]
    None,
    /// Marker file created inside a directory.
    MarkerCreated { path: PathBuf },
    /// Permission bits changed.
    PermissionsChanged { mode: u32 },
    /// Symbolic link created pointing at the target.
    LinkCreated { link: PathBuf },
    /// Symbolic link removed.
    LinkDeleted,
    /// Source file compiled and scored.
    Compiled {
        score: u8,
        errors: u32,
        warnings: u32,
        compiler: ExitKind,
        filter: ExitKind,
        timed_out: bool,
    },
    /// The action was attempted and failed.
    Failed { action: String, message: String },
}

impl ActionOutcome {
    /// Create a failed outcome.
    pub fn failed(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            action: action.into(),
            message: message.into(),
        }
    }

    /// Whether the action failed outright.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Everything one worker learned about its target.
///
/// Optional fields are only set when the matching flag was requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionReport {
    /// Path as given on the command line.
    pub path: PathBuf,
    /// Entity kind.
    pub kind: EntityKind,
    /// Basename (`-n`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<CompactString>,
    /// Size in bytes (`-d`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Permission bits masked to `0o777` (`-a`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<u32>,
    /// Kind-specific counts (`-c`, `-h`, `-t`), one per requested flag.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub counts: Vec<TypeCount>,
    /// Last modification time (`-m`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Local>>,
    /// Outcome of the mutating action.
    pub action: ActionOutcome,
    /// Requested fields that could not be gathered.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<FieldError>,
}

impl InspectionReport {
    /// Create an empty report for a target.
    pub fn new(path: impl Into<PathBuf>, kind: EntityKind) -> Self {
        Self {
            path: path.into(),
            kind,
            name: None,
            size: None,
            permissions: None,
            counts: Vec::new(),
            modified: None,
            action: ActionOutcome::None,
            field_errors: Vec::new(),
        }
    }

    /// Record a field that could not be gathered.
    pub fn field_failed(&mut self, field: impl Into<String>, message: impl ToString) {
        self.field_errors.push(FieldError::new(field, message.to_string()));
    }

    /// Render the report as delimited text, ready for a single write.
    pub fn render(&self) -> String {
        let label = match self.kind {
            EntityKind::Directory => "Directory",
            EntityKind::Symlink => "Symbolic link",
            EntityKind::File | EntityKind::Other => "File",
        };

        let mut out = String::with_capacity(512);
        let _ = writeln!(out, "{DELIMITER}");
        let _ = writeln!(out, "Path: {}", self.path.display());

        if let Some(name) = &self.name {
            let _ = writeln!(out, "{label} name: {name}");
        }
        if let Some(size) = self.size {
            let what = if self.kind == EntityKind::Directory { "total size" } else { "size" };
            let _ = writeln!(out, "{label} {what}: {}", format_bytes(size));
        }
        if let Some(mode) = self.permissions {
            let _ = writeln!(out, "Permissions ({mode:03o}):");
            out.push_str(&format_permissions(mode));
        }
        for count in &self.counts {
            let _ = match *count {
                TypeCount::HardLinks(n) => writeln!(out, "Hard link count: {n}"),
                TypeCount::CFiles(n) => writeln!(out, "Total number of .c files: {n}"),
                TypeCount::Lines(n) => writeln!(out, "Number of lines: {n}"),
                TypeCount::TargetSize(n) => writeln!(out, "Target size: {}", format_bytes(n)),
            };
        }
        if let Some(modified) = &self.modified {
            let _ = writeln!(out, "Last modified: {}", modified.format("%Y-%m-%d %H:%M:%S"));
        }
        for err in &self.field_errors {
            let _ = writeln!(out, "{}: unavailable ({})", err.field, err.message);
        }

        match &self.action {
            ActionOutcome::None => {}
            ActionOutcome::MarkerCreated { path } => {
                let _ = writeln!(out, "Created file {}", path.display());
            }
            ActionOutcome::PermissionsChanged { mode } => {
                let _ = writeln!(out, "Changed permissions to {mode:03o}");
            }
            ActionOutcome::LinkCreated { link } => {
                let _ = writeln!(out, "Created symbolic link {}", link.display());
            }
            ActionOutcome::LinkDeleted => {
                let _ = writeln!(out, "Symbolic link deleted");
            }
            ActionOutcome::Compiled {
                score,
                errors,
                warnings,
                compiler,
                filter,
                timed_out,
            } => {
                let _ = writeln!(
                    out,
                    "Compiled: {errors} error(s), {warnings} warning(s), score {score}"
                );
                if *timed_out {
                    let _ = writeln!(out, "Compile timed out; score taken from partial output");
                }
                if !compiler.is_success() {
                    let _ = writeln!(out, "Compiler {compiler}");
                }
                if filter.is_signal() || *filter == ExitKind::Unknown {
                    let _ = writeln!(out, "Filter {filter}");
                }
            }
            ActionOutcome::Failed { action, message } => {
                let _ = writeln!(out, "Error during {action}: {message}");
            }
        }

        let _ = writeln!(out, "{DELIMITER}");
        out
    }
}

/// Format permission bits as owner, group and other triads.
pub fn format_permissions(mode: u32) -> String {
    const TRIADS: [(&str, u32); 3] = [("User", 6), ("Group", 3), ("Others", 0)];

    TRIADS
        .iter()
        .map(|(who, shift)| {
            let bits = (mode >> shift) & 0o7;
            let yes_no = |mask: u32| if bits & mask != 0 { "yes" } else { "no" };
            format!(
                "{who}:\n\tRead - {}\n\tWrite - {}\n\tExec - {}\n",
                yes_no(0o4),
                yes_no(0o2),
                yes_no(0o1)
            )
        })
        .join("\n")
}

fn format_bytes(bytes: u64) -> String {
    format!("{bytes} bytes ({})", humansize::format_size(bytes, humansize::BINARY))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_permissions() {
        let text = format_permissions(0o750);
        assert!(text.starts_with("User:\n\tRead - yes\n\tWrite - yes\n\tExec - yes\n"));
        assert!(text.contains("Group:\n\tRead - yes\n\tWrite - no\n\tExec - yes\n"));
        assert!(text.ends_with("Others:\n\tRead - no\n\tWrite - no\n\tExec - no\n"));
    }

    #[test]
    fn test_render_only_requested_fields() {
        let mut report = InspectionReport::new("/tmp/dir", EntityKind::Directory);
        report.name = Some("dir".into());
        let text = report.render();

        assert!(text.starts_with(DELIMITER));
        assert!(text.trim_end().ends_with(DELIMITER));
        assert!(text.contains("Directory name: dir"));
        assert!(!text.contains("size"));
        assert!(!text.contains("Permissions"));
    }

    #[test]
    fn test_render_zero_size_is_shown_when_requested() {
        let mut report = InspectionReport::new("/tmp/empty", EntityKind::Directory);
        report.size = Some(0);
        assert!(report.render().contains("Directory total size: 0 bytes"));
    }

    #[test]
    fn test_render_field_error() {
        let mut report = InspectionReport::new("dangling", EntityKind::Symlink);
        report.field_failed("Target size", "No such file or directory");
        let text = report.render();
        assert!(text.contains("Target size: unavailable (No such file or directory)"));
        assert!(!text.contains("Target size: 0"));
    }

    #[test]
    fn test_render_compiled() {
        let mut report = InspectionReport::new("main.c", EntityKind::File);
        report.action = ActionOutcome::Compiled {
            score: 7,
            errors: 0,
            warnings: 3,
            compiler: ExitKind::Code(0),
            filter: ExitKind::Code(0),
            timed_out: false,
        };
        let text = report.render();
        assert!(text.contains("Compiled: 0 error(s), 3 warning(s), score 7"));
        assert!(!text.contains("Compiler"));
    }

    #[test]
    fn test_exit_kind_display() {
        assert_eq!(ExitKind::Code(1).to_string(), "exited with code 1");
        assert_eq!(ExitKind::Signal(9).to_string(), "terminated by signal 9");
    }

    #[test]
    fn test_json_omits_unset_fields() {
        let report = InspectionReport::new("a", EntityKind::File);
        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("size"));
        assert!(!json.contains("field_errors"));
    }
}
