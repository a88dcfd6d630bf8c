//! Target preparation and worker orchestration.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use filegrade_core::{EntityKind, Flag, OptionError, Options, ResolutionError, TargetSpec};
use filegrade_scan::resolve_kind;

use crate::barrier::StartBarrier;
use crate::error::{SpawnError, TargetError, TargetFailure};
use crate::options::OptionSource;
use crate::sink::{ReportFormat, json_line};
use crate::worker::{EntityWorker, WorkerContext, WorkerExit, WorkerId};

/// Targets ready to spawn plus the ones that were rejected.
#[derive(Debug, Default)]
pub struct Preparation {
    /// Resolved targets, in command-line order.
    pub specs: Vec<TargetSpec>,
    /// Targets that could not be resolved or whose options were invalid.
    pub failures: Vec<TargetFailure>,
}

impl Preparation {
    /// Check if every target was accepted.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Group command-line tokens into target specs.
///
/// Each target is a path, optionally followed by an option string starting
/// with `-`. A regular file whose options include `l` takes the next token
/// as its link name. Missing options and link names are requested from
/// `source`. A target that cannot be resolved still consumes its option
/// string but never a link name. A file whose option string contains `l`
/// but fails to parse still consumes its link name.
pub fn prepare(tokens: &[String], source: &mut dyn OptionSource) -> Preparation {
    let mut prepared = Preparation::default();
    let mut tokens = tokens.iter().peekable();

    while let Some(raw) = tokens.next() {
        let path = PathBuf::from(raw);
        let option_token = tokens.next_if(|t| t.starts_with('-'));

        let kind = match resolve_supported(&path) {
            Ok(kind) => kind,
            Err(e) => {
                warn!(path = %path.display(), "skipping target: {e}");
                prepared.failures.push(TargetFailure {
                    path,
                    error: e.into(),
                });
                continue;
            }
        };

        let options = match option_token {
            Some(token) => Options::parse(token, kind),
            None => source.options_for(&path, kind),
        };
        let options = match options {
            Ok(options) => options,
            Err(e) => {
                // A rejected `-l...` on a file still owns its link name
                if kind == EntityKind::File && option_token.is_some_and(|t| t.contains('l')) {
                    tokens.next();
                }
                prepared.failures.push(TargetFailure {
                    path,
                    error: e.into(),
                });
                continue;
            }
        };

        let link_name = if kind == EntityKind::File && options.has(Flag::Link) {
            let given = option_token.and_then(|_| tokens.next().cloned());
            match given.map_or_else(|| source.link_name_for(&path), Ok) {
                Ok(name) => Some(name),
                Err(e) => {
                    prepared.failures.push(TargetFailure {
                        path,
                        error: e.into(),
                    });
                    continue;
                }
            }
        } else {
            None
        };

        match TargetSpec::new(&path, kind, options, link_name) {
            Ok(spec) => {
                debug!(path = %path.display(), %kind, "target prepared");
                prepared.specs.push(spec);
            }
            Err(e) => prepared.failures.push(TargetFailure {
                path,
                error: TargetError::Option(e),
            }),
        }
    }

    prepared
}

fn resolve_supported(path: &Path) -> Result<EntityKind, ResolutionError> {
    let kind = resolve_kind(path)?;
    if kind.is_supported() {
        Ok(kind)
    } else {
        Err(ResolutionError::Unsupported {
            path: path.to_path_buf(),
        })
    }
}

/// How one worker ended, reported in completion order.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerTermination {
    pub id: WorkerId,
    pub path: PathBuf,
    pub exit: WorkerExit,
}

impl WorkerTermination {
    /// Status line for this termination.
    pub fn status_line(&self, format: ReportFormat) -> String {
        match format {
            ReportFormat::Text => format!(
                "Worker {} for {} {}\n",
                self.id,
                self.path.display(),
                self.exit
            ),
            ReportFormat::Json => json_line(self),
        }
    }
}

/// Result of a full orchestrated run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Every worker that ran, in completion order.
    pub terminations: Vec<WorkerTermination>,
    /// Targets whose worker could not be spawned.
    pub spawn_failures: Vec<SpawnError>,
}

impl RunSummary {
    /// Check if every worker was spawned and succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.spawn_failures.is_empty() && self.terminations.iter().all(|t| t.exit.is_success())
    }
}

/// Spawns one worker per target and gates them on a shared barrier.
pub struct Orchestrator {
    ctx: WorkerContext,
    barrier: StartBarrier,
    tasks: JoinSet<WorkerTermination>,
    next_id: u32,
}

impl Orchestrator {
    /// Create an orchestrator with the barrier held.
    pub fn new(ctx: WorkerContext) -> Self {
        Self {
            ctx,
            barrier: StartBarrier::new(),
            tasks: JoinSet::new(),
            next_id: 1,
        }
    }

    /// Number of workers spawned and not yet collected.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Spawn a worker for `spec`. It waits at the barrier until
    /// [`release_barrier`](Self::release_barrier) is called.
    pub fn spawn(&mut self, spec: TargetSpec) -> Result<WorkerId, SpawnError> {
        let handle = Handle::try_current().map_err(|_| SpawnError::NoRuntime {
            path: spec.path.clone(),
        })?;

        let id = WorkerId(self.next_id);
        self.next_id += 1;

        let path = spec.path.clone();
        let gate = self.barrier.gate();
        let worker = EntityWorker::new(spec, self.ctx.clone());

        // The inner task is awaited through its handle so a panic is
        // reported against the worker that raised it.
        let inner = handle.spawn(worker.run(gate));
        self.tasks.spawn_on(
            async move {
                let exit = match inner.await {
                    Ok(exit) => exit,
                    Err(e) if e.is_panic() => WorkerExit::Panicked {
                        message: panic_message(e.into_panic()),
                    },
                    Err(_) => WorkerExit::Aborted,
                };
                WorkerTermination { id, path, exit }
            },
            &handle,
        );

        debug!(worker = %id, "worker spawned");
        Ok(id)
    }

    /// Let every spawned worker proceed.
    pub fn release_barrier(&self) {
        if self.barrier.release() {
            info!(workers = self.tasks.len(), "start barrier released");
        }
    }

    /// Wait for every worker, emitting one status line per termination as
    /// it happens. Releases the barrier first if it is still held.
    pub async fn collect(&mut self) -> Vec<WorkerTermination> {
        self.release_barrier();

        let mut terminations = Vec::with_capacity(self.tasks.len());
        while let Some(result) = self.tasks.join_next().await {
            let termination = match result {
                Ok(termination) => termination,
                Err(e) => {
                    warn!("worker supervisor failed: {e}");
                    continue;
                }
            };

            let line = termination.status_line(self.ctx.format());
            if let Err(e) = self.ctx.reports().emit(&line) {
                warn!(worker = %termination.id, "failed to write status: {e}");
            }
            terminations.push(termination);
        }
        terminations
    }

    /// Spawn every spec, release the barrier, and wait for all workers.
    pub async fn run(mut self, specs: Vec<TargetSpec>) -> RunSummary {
        let mut summary = RunSummary::default();
        for spec in specs {
            if let Err(e) = self.spawn(spec) {
                warn!("{e}");
                summary.spawn_failures.push(e);
            }
        }

        self.release_barrier();
        summary.terminations = self.collect().await;
        summary
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
