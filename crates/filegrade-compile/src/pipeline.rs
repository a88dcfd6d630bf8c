//! Two-stage compile pipeline: compiler stderr → filter → captured text.

use std::io::{self, Read};
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use filegrade_core::{ActionOutcome, DiagnosticRecord, ExitKind, InspectConfig, SubprocessSpawnError};
use filegrade_scan::basename;

use crate::sink::ScoreSink;

/// Stages a pipeline passes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Spawned,
    PipesWired,
    Running,
    Draining,
    BothReaped,
    Scored,
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Spawned => "spawned",
            Self::PipesWired => "pipes-wired",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::BothReaped => "both-reaped",
            Self::Scored => "scored",
        };
        f.write_str(name)
    }
}

/// Errors that stop a pipeline from producing a score.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A pipe or subprocess could not be created.
    #[error(transparent)]
    Spawn(#[from] SubprocessSpawnError),

    /// The filtered diagnostic stream could not be read.
    #[error("Failed to read filtered diagnostics: {0}")]
    Drain(#[source] io::Error),

    /// The score could not be appended to the log.
    #[error("Failed to append score for {name}: {source}")]
    ScoreLog {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Result of one compile attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutcome {
    /// Basename written to the score log.
    pub name: String,
    /// Classified diagnostics.
    pub record: DiagnosticRecord,
    /// How the compiler terminated.
    pub compiler: ExitKind,
    /// How the filter terminated.
    pub filter: ExitKind,
    /// Whether the timeout fired and the children were killed.
    pub timed_out: bool,
}

impl CompileOutcome {
    /// Convert into the report's action outcome.
    pub fn into_action(self) -> ActionOutcome {
        ActionOutcome::Compiled {
            score: self.record.score,
            errors: self.record.errors,
            warnings: self.record.warnings,
            compiler: self.compiler,
            filter: self.filter,
            timed_out: self.timed_out,
        }
    }
}

/// Compiles a source file and scores its filtered diagnostics.
pub struct CompilePipeline {
    compiler: String,
    compiler_args: Vec<String>,
    filter: String,
    filter_args: Vec<String>,
    timeout: Option<Duration>,
    sink: Arc<dyn ScoreSink>,
}

impl CompilePipeline {
    /// Create a pipeline with explicit commands and no timeout.
    pub fn new(
        compiler: impl Into<String>,
        compiler_args: Vec<String>,
        filter: impl Into<String>,
        filter_args: Vec<String>,
        sink: Arc<dyn ScoreSink>,
    ) -> Self {
        Self {
            compiler: compiler.into(),
            compiler_args,
            filter: filter.into(),
            filter_args,
            timeout: None,
            sink,
        }
    }

    /// Create a pipeline from an inspection config.
    pub fn from_config(config: &InspectConfig, sink: Arc<dyn ScoreSink>) -> Self {
        Self::new(
            config.compiler.clone(),
            config.compiler_args.clone(),
            config.filter.clone(),
            config.filter_args.clone(),
            sink,
        )
        .with_timeout(config.compile_timeout())
    }

    /// Set the limit applied to draining and to reaping.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Compile `source`, score its diagnostics and append the score line.
    pub async fn run(&self, source: &Path) -> Result<CompileOutcome, PipelineError> {
        let name = basename(source).to_string();
        trace_state(&name, PipelineState::Spawned);

        let (p1_read, p1_write) = io::pipe().map_err(|e| SubprocessSpawnError::new("pipe", e))?;
        let (p2_read, p2_write) = io::pipe().map_err(|e| SubprocessSpawnError::new("pipe", e))?;
        trace_state(&name, PipelineState::PipesWired);

        // Each Command owns the pipe ends handed to its child and is dropped at
        // the end of its block, closing the parent's copies. Only p2_read
        // survives in this process, so the drain sees EOF once the filter exits.
        let mut compiler = {
            let mut cmd = Command::new(&self.compiler);
            cmd.args(&self.compiler_args)
                .arg(source)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(p1_write)
                .kill_on_drop(true);
            cmd.spawn()
                .map_err(|e| SubprocessSpawnError::new("compiler", e))?
        };

        let spawned_filter = {
            let mut cmd = Command::new(&self.filter);
            cmd.args(&self.filter_args)
                .stdin(p1_read)
                .stdout(p2_write)
                .stderr(Stdio::null())
                .kill_on_drop(true);
            cmd.spawn()
        };
        let mut filter = match spawned_filter {
            Ok(child) => child,
            Err(e) => {
                let _ = compiler.kill().await;
                return Err(SubprocessSpawnError::new("filter", e).into());
            }
        };
        trace_state(&name, PipelineState::Running);

        let mut drain: JoinHandle<io::Result<Vec<u8>>> = tokio::task::spawn_blocking(move || {
            let mut reader = p2_read;
            let mut buf = Vec::new();
            reader.read_to_end(&mut buf)?;
            Ok(buf)
        });
        trace_state(&name, PipelineState::Draining);

        let mut timed_out = false;
        let drained = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut drain).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(file = %name, ?limit, "compile timed out while draining, killing subprocesses");
                    timed_out = true;
                    kill_both(&mut compiler, &mut filter);
                    drain.await
                }
            },
            None => drain.await,
        };
        let bytes = drained
            .map_err(|e| PipelineError::Drain(io::Error::other(e)))?
            .map_err(PipelineError::Drain)?;

        let (compiler_status, filter_status) = match self.timeout {
            Some(limit) if !timed_out => {
                match tokio::time::timeout(limit, reap_both(&mut compiler, &mut filter)).await {
                    Ok(statuses) => statuses,
                    Err(_) => {
                        warn!(file = %name, ?limit, "compile timed out while reaping, killing subprocesses");
                        timed_out = true;
                        kill_both(&mut compiler, &mut filter);
                        reap_both(&mut compiler, &mut filter).await
                    }
                }
            }
            _ => reap_both(&mut compiler, &mut filter).await,
        };
        trace_state(&name, PipelineState::BothReaped);

        if !compiler_status.is_success() {
            debug!(file = %name, "compiler {compiler_status}");
        }
        if filter_status.is_signal() || filter_status == ExitKind::Unknown {
            warn!(file = %name, "filter {filter_status}");
        }

        let record = DiagnosticRecord::from_text(String::from_utf8_lossy(&bytes));
        trace_state(&name, PipelineState::Scored);

        let sink = Arc::clone(&self.sink);
        let log_name = name.clone();
        let score = record.score;
        tokio::task::spawn_blocking(move || sink.append(&log_name, score))
            .await
            .map_err(io::Error::other)
            .and_then(|r| r)
            .map_err(|source| PipelineError::ScoreLog {
                name: name.clone(),
                source,
            })?;

        Ok(CompileOutcome {
            name,
            record,
            compiler: compiler_status,
            filter: filter_status,
            timed_out,
        })
    }
}

fn trace_state(name: &str, state: PipelineState) {
    debug!(file = %name, %state, "pipeline state");
}

fn kill_both(compiler: &mut Child, filter: &mut Child) {
    // Either child may already have exited; that is not an error here
    let _ = compiler.start_kill();
    let _ = filter.start_kill();
}

async fn reap_both(compiler: &mut Child, filter: &mut Child) -> (ExitKind, ExitKind) {
    let compiler_status = compiler.wait().await;
    let filter_status = filter.wait().await;
    (exit_kind(compiler_status), exit_kind(filter_status))
}

/// Classify a wait result as normal exit, signal, or unknown.
fn exit_kind(status: io::Result<ExitStatus>) -> ExitKind {
    let status = match status {
        Ok(status) => status,
        Err(e) => {
            warn!("failed to wait for subprocess: {e}");
            return ExitKind::Unknown;
        }
    };

    if let Some(code) = status.code() {
        return ExitKind::Code(code);
    }
    signal_of(&status).map_or(ExitKind::Unknown, ExitKind::Signal)
}

#[cfg(unix)]
fn signal_of(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn signal_of(_status: &ExitStatus) -> Option<i32> {
    None
}
