//! Compile-and-score pipeline for filegrade.
//!
//! A source file is compiled by one subprocess whose diagnostic stream is
//! piped into a second, filtering subprocess. The filtered text is drained
//! to end-of-stream, classified into a [`DiagnosticRecord`], and the
//! resulting score is appended to a [`ScoreSink`].
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use filegrade_compile::{CompilePipeline, FileScoreLog};
//! use filegrade_core::InspectConfig;
//!
//! # async fn demo() {
//! let config = InspectConfig::default();
//! let sink = Arc::new(FileScoreLog::new(&config.score_log));
//! let pipeline = CompilePipeline::from_config(&config, sink);
//!
//! let outcome = pipeline.run("main.c".as_ref()).await.unwrap();
//! println!("score {}", outcome.record.score);
//! # }
//! ```

mod pipeline;
mod sink;

pub use pipeline::{CompileOutcome, CompilePipeline, PipelineError, PipelineState};
pub use sink::{FileScoreLog, MemoryScoreLog, ScoreSink};

// Re-export core types for convenience
pub use filegrade_core::{DiagnosticRecord, ExitKind};
