//! Barrier-synchronized inspection workers for filegrade.
//!
//! The [`Orchestrator`] turns command-line tokens into [`TargetSpec`]s,
//! spawns one [`EntityWorker`] task per target, and holds every worker at a
//! [`StartBarrier`] until the last one has been spawned. After release the
//! workers run in parallel: each gathers the metadata its flags ask for,
//! performs its single mutating action (compiling source files through the
//! compile pipeline) and writes one report in a single call.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use filegrade_compile::{CompilePipeline, FileScoreLog};
//! use filegrade_core::InspectConfig;
//! use filegrade_worker::{Orchestrator, PresetOptions, StdoutSink, WorkerContext, prepare};
//!
//! # async fn demo() {
//! let config = Arc::new(InspectConfig::default());
//! let sink = Arc::new(FileScoreLog::new(&config.score_log));
//! let pipeline = Arc::new(CompilePipeline::from_config(&config, sink));
//! let ctx = WorkerContext::new(config, pipeline, Arc::new(StdoutSink));
//!
//! let tokens = vec!["src".to_string(), "-nd".to_string()];
//! let prepared = prepare(&tokens, &mut PresetOptions);
//! let summary = Orchestrator::new(ctx).run(prepared.specs).await;
//! println!("{} workers finished", summary.terminations.len());
//! # }
//! ```

mod barrier;
mod error;
mod options;
mod orchestrator;
mod sink;
mod worker;

pub use barrier::{BarrierDropped, StartBarrier, StartGate};
pub use error::{SpawnError, TargetError, TargetFailure};
pub use options::{OptionSource, PresetOptions};
pub use orchestrator::{Orchestrator, Preparation, RunSummary, WorkerTermination, prepare};
pub use sink::{MemoryReportSink, ReportFormat, ReportSink, StdoutSink};
pub use worker::{EntityWorker, WorkerContext, WorkerExit, WorkerId};

// Re-export core types for convenience
pub use filegrade_core::{EntityKind, InspectionReport, TargetSpec};
