//! Report output sinks.

use std::io::{self, Write};
use std::sync::Mutex;

use serde::Serialize;

use filegrade_core::InspectionReport;

/// Output format for reports and status lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Delimited human-readable text.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl ReportFormat {
    /// Render a report in this format, ending with a newline.
    pub fn render(&self, report: &InspectionReport) -> String {
        match self {
            Self::Text => report.render(),
            Self::Json => json_line(report),
        }
    }
}

/// Serialize a value as a single JSON line.
pub(crate) fn json_line<T: Serialize>(value: &T) -> String {
    match serde_json::to_string(value) {
        Ok(mut line) => {
            line.push('\n');
            line
        }
        Err(e) => format!("{{\"error\":\"{e}\"}}\n"),
    }
}

/// Destination for rendered reports.
///
/// Each call receives one complete block of text and must write it in one
/// piece, so blocks from concurrent workers never interleave line by line.
pub trait ReportSink: Send + Sync {
    /// Write one complete block.
    fn emit(&self, block: &str) -> io::Result<()>;
}

/// Writes blocks to stdout under the stdout lock.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl ReportSink for StdoutSink {
    fn emit(&self, block: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(block.as_bytes())?;
        out.flush()
    }
}

/// Collects blocks in memory.
#[derive(Debug, Default)]
pub struct MemoryReportSink {
    blocks: Mutex<Vec<String>>,
}

impl MemoryReportSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every block emitted so far, in emission order.
    pub fn blocks(&self) -> Vec<String> {
        match self.blocks.lock() {
            Ok(blocks) => blocks.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ReportSink for MemoryReportSink {
    fn emit(&self, block: &str) -> io::Result<()> {
        match self.blocks.lock() {
            Ok(mut blocks) => blocks.push(block.to_string()),
            Err(poisoned) => poisoned.into_inner().push(block.to_string()),
        }
        Ok(())
    }
}
