//! The per-target entity worker.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use filegrade_compile::CompilePipeline;
use filegrade_core::{
    ActionOutcome, EntityKind, Flag, InspectConfig, InspectionReport, TargetSpec, TypeCount,
};
use filegrade_ops::{
    ActionKind, OperationError, create_marker, create_symlink, delete_symlink, set_permissions,
};
use filegrade_scan::{
    basename, c_file_count, count_lines, directory_size, hard_link_count, modified_time,
    permission_bits, resolve_kind, symlink_target_size,
};

use crate::barrier::StartGate;
use crate::sink::{ReportFormat, ReportSink};

/// Identifier assigned to a worker at spawn time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct WorkerId(pub u32);

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a worker finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum WorkerExit {
    /// Report emitted and the action (if any) succeeded.
    Success,
    /// Report emitted but the entity vanished or its action failed.
    Failed { reason: String },
    /// The barrier went away before release; nothing was done.
    Aborted,
    /// The worker task panicked.
    Panicked { message: String },
}

impl WorkerExit {
    /// Numeric status in the style of a process exit code.
    pub fn code(&self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failed { .. } => 1,
            Self::Aborted => 2,
            Self::Panicked { .. } => 101,
        }
    }

    /// Check if the worker succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl std::fmt::Display for WorkerExit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "exited with code 0"),
            Self::Failed { reason } => write!(f, "exited with code 1 ({reason})"),
            Self::Aborted => write!(f, "aborted before start"),
            Self::Panicked { message } => write!(f, "panicked ({message})"),
        }
    }
}

/// Shared, read-only collaborators handed to every worker.
#[derive(Clone)]
pub struct WorkerContext {
    pub(crate) config: Arc<InspectConfig>,
    pub(crate) pipeline: Arc<CompilePipeline>,
    pub(crate) reports: Arc<dyn ReportSink>,
    pub(crate) format: ReportFormat,
}

impl WorkerContext {
    /// Create a context writing text reports.
    pub fn new(
        config: Arc<InspectConfig>,
        pipeline: Arc<CompilePipeline>,
        reports: Arc<dyn ReportSink>,
    ) -> Self {
        Self {
            config,
            pipeline,
            reports,
            format: ReportFormat::Text,
        }
    }

    /// Set the report format.
    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    /// Report format in use.
    pub fn format(&self) -> ReportFormat {
        self.format
    }

    /// Sink receiving reports and status lines.
    pub fn reports(&self) -> &Arc<dyn ReportSink> {
        &self.reports
    }
}

/// Inspects one target after the start barrier opens.
pub struct EntityWorker {
    spec: TargetSpec,
    ctx: WorkerContext,
}

impl EntityWorker {
    /// Create a worker owning its target spec.
    pub fn new(spec: TargetSpec, ctx: WorkerContext) -> Self {
        Self { spec, ctx }
    }

    /// Wait for the barrier, inspect, act, and emit the report.
    pub async fn run(self, gate: StartGate) -> WorkerExit {
        if gate.wait().await.is_err() {
            warn!(path = %self.spec.path.display(), "barrier dropped, worker not started");
            return WorkerExit::Aborted;
        }

        let (report, exit) = self.inspect().await;

        let block = self.ctx.format.render(&report);
        if let Err(e) = self.ctx.reports.emit(&block) {
            warn!(path = %self.spec.path.display(), "failed to write report: {e}");
            return WorkerExit::Failed {
                reason: format!("report not written: {e}"),
            };
        }
        exit
    }

    /// Gather requested metadata and perform the action, without waiting
    /// on any barrier.
    pub async fn inspect(&self) -> (InspectionReport, WorkerExit) {
        let path = self.spec.path.clone();

        match resolve_kind(&path) {
            Ok(kind) if kind == self.spec.kind => {}
            Ok(kind) => {
                let reason = format!("changed from {} to {kind}", self.spec.kind);
                let mut report = InspectionReport::new(&path, self.spec.kind);
                report.action = ActionOutcome::failed("inspect", reason.clone());
                return (report, WorkerExit::Failed { reason });
            }
            Err(e) => {
                let mut report = InspectionReport::new(&path, self.spec.kind);
                report.action = ActionOutcome::failed("inspect", e.to_string());
                return (report, WorkerExit::Failed { reason: e.to_string() });
            }
        }

        let spec = self.spec.clone();
        let mut report = match tokio::task::spawn_blocking(move || gather(&spec)).await {
            Ok(report) => report,
            Err(e) => {
                let mut report = InspectionReport::new(&path, self.spec.kind);
                report.field_failed("Metadata", format!("task failed: {e}"));
                report
            }
        };

        report.action = self.act().await;
        let exit = match &report.action {
            ActionOutcome::Failed { message, .. } => WorkerExit::Failed {
                reason: message.clone(),
            },
            _ => WorkerExit::Success,
        };
        (report, exit)
    }

    /// Perform the single mutating action for this entity.
    async fn act(&self) -> ActionOutcome {
        let spec = &self.spec;
        let config = &self.ctx.config;

        let result = match spec.kind {
            EntityKind::Directory => create_marker(&spec.path, config.marker_content.clone())
                .await
                .map(|path| ActionOutcome::MarkerCreated { path }),
            EntityKind::Symlink if spec.options.has(Flag::Link) => delete_symlink(&spec.path)
                .await
                .map(|()| ActionOutcome::LinkDeleted),
            EntityKind::Symlink => set_permissions(&spec.path, config.symlink_mode)
                .await
                .map(|mode| ActionOutcome::PermissionsChanged { mode }),
            EntityKind::File if spec.options.has(Flag::Link) => match &spec.link_name {
                Some(name) => create_symlink(&spec.path, Path::new(name))
                    .await
                    .map(|link| ActionOutcome::LinkCreated { link }),
                None => Err(OperationError::new(
                    ActionKind::CreateLink,
                    spec.path.clone(),
                    "no link name",
                )),
            },
            EntityKind::File if spec.is_source(&config.source_extension) => {
                return self.compile().await;
            }
            EntityKind::File | EntityKind::Other => Ok(ActionOutcome::None),
        };

        result.unwrap_or_else(|e| {
            warn!(path = %e.path.display(), "{} failed: {}", e.action, e.message);
            ActionOutcome::failed(e.action.to_string(), e.message)
        })
    }

    async fn compile(&self) -> ActionOutcome {
        debug!(path = %self.spec.path.display(), "compiling source file");
        match self.ctx.pipeline.run(&self.spec.path).await {
            Ok(outcome) => outcome.into_action(),
            Err(e) => {
                warn!(path = %self.spec.path.display(), "compile failed: {e}");
                ActionOutcome::failed(ActionKind::Compile.to_string(), e.to_string())
            }
        }
    }
}

/// Build a report holding exactly the fields the spec's flags request.
fn gather(spec: &TargetSpec) -> InspectionReport {
    let path = spec.path.as_path();
    let mut report = InspectionReport::new(path, spec.kind);

    for flag in spec.options.iter() {
        match flag {
            Flag::Name => report.name = Some(basename(path)),
            Flag::Size => {
                let size = match spec.kind {
                    EntityKind::Directory => directory_size(path).map_err(|e| e.to_string()),
                    _ => std::fs::symlink_metadata(path)
                        .map(|m| m.len())
                        .map_err(|e| e.to_string()),
                };
                match size {
                    Ok(size) => report.size = Some(size),
                    Err(e) => report.field_failed("Size", e),
                }
            }
            Flag::Access => match permission_bits(path) {
                Ok(mode) => report.permissions = Some(mode),
                Err(e) => report.field_failed("Permissions", e),
            },
            Flag::Count => {
                let count = match spec.kind {
                    EntityKind::Directory => c_file_count(path).map(TypeCount::CFiles),
                    _ => count_lines(path).map(TypeCount::Lines),
                };
                match count {
                    Ok(count) => report.counts.push(count),
                    Err(e) => report.field_failed("Count", e),
                }
            }
            Flag::HardLinks => match hard_link_count(path) {
                Ok(n) => report.counts.push(TypeCount::HardLinks(n)),
                Err(e) => report.field_failed("Hard link count", e),
            },
            Flag::TargetSize => match symlink_target_size(path) {
                Ok(n) => report.counts.push(TypeCount::TargetSize(n)),
                Err(e) => report.field_failed("Target size", e),
            },
            Flag::Modified => match modified_time(path) {
                Ok(time) => report.modified = Some(time),
                Err(e) => report.field_failed("Last modified", e),
            },
            // The action is performed after gathering
            Flag::Link => {}
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use filegrade_core::Options;
    use std::fs;
    use tempfile::TempDir;

    fn spec(path: &Path, kind: EntityKind, opts: &str) -> TargetSpec {
        TargetSpec::new(path, kind, Options::parse(opts, kind).unwrap(), None).unwrap()
    }

    #[test]
    fn test_gather_only_requested() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("notes.txt");
        fs::write(&file, "a\nb\n").unwrap();

        let report = gather(&spec(&file, EntityKind::File, "-nc"));
        assert_eq!(report.name.as_deref(), Some("notes.txt"));
        assert_eq!(report.counts, vec![TypeCount::Lines(2)]);
        assert!(report.size.is_none());
        assert!(report.permissions.is_none());
        assert!(report.modified.is_none());
    }

    #[test]
    fn test_gather_line_and_hard_link_counts() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("notes.txt");
        fs::write(&file, "a\nb\nc\n").unwrap();

        let report = gather(&spec(&file, EntityKind::File, "-ch"));
        assert_eq!(
            report.counts,
            vec![TypeCount::Lines(3), TypeCount::HardLinks(1)]
        );

        let text = report.render();
        assert!(text.contains("Number of lines: 3"));
        assert!(text.contains("Hard link count: 1"));
    }

    #[test]
    fn test_gather_directory_size() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("d");
        fs::create_dir_all(dir.join("sub")).unwrap();
        fs::write(dir.join("a"), vec![0u8; 100]).unwrap();
        fs::write(dir.join("sub/b"), vec![0u8; 50]).unwrap();

        let report = gather(&spec(&dir, EntityKind::Directory, "-d"));
        assert_eq!(report.size, Some(150));
    }

    #[cfg(unix)]
    #[test]
    fn test_gather_dangling_target_size() {
        let temp = TempDir::new().unwrap();
        let link = temp.path().join("ln");
        std::os::unix::fs::symlink("missing.txt", &link).unwrap();

        let report = gather(&spec(&link, EntityKind::Symlink, "-nt"));
        assert_eq!(report.name.as_deref(), Some("ln"));
        assert!(report.counts.is_empty());
        assert_eq!(report.field_errors.len(), 1);
        assert_eq!(report.field_errors[0].field, "Target size");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(WorkerExit::Success.code(), 0);
        assert_eq!(WorkerExit::Failed { reason: "x".into() }.code(), 1);
        assert_eq!(WorkerExit::Aborted.to_string(), "aborted before start");
    }
}
