//! Inspection configuration types.

use std::path::PathBuf;
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration for an inspection run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct InspectConfig {
    /// Append-only log receiving one `<name>: <score>` line per compiled file.
    #[builder(default = "default_score_log()")]
    pub score_log: PathBuf,

    /// Compiler executable.
    #[builder(default = "default_compiler()")]
    pub compiler: String,

    /// Arguments passed to the compiler before the source path.
    #[builder(default = "default_compiler_args()")]
    pub compiler_args: Vec<String>,

    /// Diagnostic filter executable, reading compiler stderr on stdin.
    #[builder(default = "default_filter()")]
    pub filter: String,

    /// Arguments passed to the filter.
    #[builder(default = "default_filter_args()")]
    pub filter_args: Vec<String>,

    /// Extension marking a regular file as a compilable source.
    #[builder(default = "default_source_extension()")]
    pub source_extension: String,

    /// Seconds before a compile is abandoned (0 = wait forever).
    #[builder(default = "60")]
    pub compile_timeout_secs: u64,

    /// Permission bits applied to inspected symlinks.
    #[builder(default = "0o760")]
    pub symlink_mode: u32,

    /// Text written into directory marker files.
    #[builder(default = "default_marker_content()")]
    pub marker_content: String,

    /// Prompt on stdin for targets given without an option string.
    #[builder(default = "true")]
    pub prompt: bool,
}

fn default_score_log() -> PathBuf {
    PathBuf::from("grades.txt")
}

fn default_compiler() -> String {
    "gcc".to_string()
}

fn default_compiler_args() -> Vec<String> {
    ["-Wall", "-c", "-o", "/dev/null"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_filter() -> String {
    "grep".to_string()
}

fn default_filter_args() -> Vec<String> {
    vec!["-E".to_string(), "error|warning".to_string()]
}

fn default_source_extension() -> String {
    "c".to_string()
}

fn default_marker_content() -> String {
    "Inspected by filegrade\n".to_string()
}

impl InspectConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        check_fields(
            self.compiler.as_deref(),
            self.filter.as_deref(),
            self.source_extension.as_deref(),
            self.symlink_mode,
        )
    }
}

fn check_fields(
    compiler: Option<&str>,
    filter: Option<&str>,
    source_extension: Option<&str>,
    symlink_mode: Option<u32>,
) -> Result<(), String> {
    if compiler.is_some_and(|c| c.trim().is_empty()) {
        return Err("Compiler cannot be empty".to_string());
    }
    if filter.is_some_and(|f| f.trim().is_empty()) {
        return Err("Filter cannot be empty".to_string());
    }
    if source_extension.is_some_and(|e| e.is_empty()) {
        return Err("Source extension cannot be empty".to_string());
    }
    if let Some(mode) = symlink_mode {
        if mode > 0o777 {
            return Err(format!("Symlink mode {mode:o} exceeds 777"));
        }
    }
    Ok(())
}

impl InspectConfig {
    /// Create a new config builder.
    pub fn builder() -> InspectConfigBuilder {
        InspectConfigBuilder::default()
    }

    /// Check a config that did not come through the builder, such as one
    /// read from a file and then overridden.
    pub fn validate(&self) -> Result<(), String> {
        check_fields(
            Some(&self.compiler),
            Some(&self.filter),
            Some(&self.source_extension),
            Some(self.symlink_mode),
        )
    }

    /// Compile timeout, if one is configured.
    pub fn compile_timeout(&self) -> Option<Duration> {
        match self.compile_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            score_log: default_score_log(),
            compiler: default_compiler(),
            compiler_args: default_compiler_args(),
            filter: default_filter(),
            filter_args: default_filter_args(),
            source_extension: default_source_extension(),
            compile_timeout_secs: 60,
            symlink_mode: 0o760,
            marker_content: default_marker_content(),
            prompt: true,
        }
    }
}
