//! filegrade - concurrent file inspector that compiles and grades C sources.
//!
//! Usage:
//!   fgrade [OPTIONS] <TARGET> [-FLAGS [LINK_NAME]] ...
//!
//! Every target gets its own worker. Workers start together once all
//! targets have been prepared, and each prints one report.

mod prompt;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{ArgAction, Parser, ValueEnum};
use color_eyre::eyre::{Context, Result, eyre};

use filegrade_compile::{CompilePipeline, FileScoreLog};
use filegrade_core::InspectConfig;
use filegrade_worker::{
    Orchestrator, Preparation, PresetOptions, ReportFormat, RunSummary, StdoutSink, TargetSpec,
    WorkerContext, prepare,
};

use crate::prompt::PromptOptions;

#[derive(Parser)]
#[command(
    name = "fgrade",
    version,
    about = "Inspect files, directories and symlinks concurrently",
    long_about = "fgrade inspects each target in its own worker and prints one report per target.\n\n\
                  Each target may be followed by an option string such as `-nda`. A regular \
                  file given `-l` is followed by the name of the symbolic link to create. \
                  C sources are compiled and their diagnostics scored into the score log.\n\n\
                  Global options must come before the first target."
)]
struct Cli {
    /// Targets, each optionally followed by its flags (and a link name)
    #[arg(
        value_name = "TARGET",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    targets: Vec<String>,

    /// Score log receiving `<name>: <score>` lines
    #[arg(long, value_name = "PATH")]
    score_log: Option<PathBuf>,

    /// TOML config file (defaults to the user config dir if present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Compiler executable
    #[arg(long)]
    compiler: Option<String>,

    /// Compile timeout in seconds (0 disables it)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Output format for reports and status lines
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Fail targets without an option string instead of prompting
    #[arg(long)]
    no_prompt: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ReportFormat::Text,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let config = Arc::new(load_config(&cli)?);

    let prepared = if config.prompt && !cli.no_prompt {
        prepare(&cli.targets, &mut PromptOptions::stdio())
    } else {
        prepare(&cli.targets, &mut PresetOptions)
    };
    report_failures(&prepared);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .wrap_err("Failed to start async runtime")?;
    let summary = runtime.block_on(run(config, cli.format.into(), prepared.specs));

    for failure in &summary.spawn_failures {
        eprintln!("{failure}");
    }

    if prepared.failures.is_empty() && summary.spawn_failures.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Spawn a worker per target and wait for all of them.
async fn run(config: Arc<InspectConfig>, format: ReportFormat, specs: Vec<TargetSpec>) -> RunSummary {
    let scores = Arc::new(FileScoreLog::new(&config.score_log));
    let pipeline = Arc::new(CompilePipeline::from_config(&config, scores));
    let ctx = WorkerContext::new(config, pipeline, Arc::new(StdoutSink)).with_format(format);

    Orchestrator::new(ctx).run(specs).await
}

fn report_failures(prepared: &Preparation) {
    for failure in &prepared.failures {
        eprintln!("Skipping {failure}");
    }
}

/// Load the config file, then apply command-line overrides.
fn load_config(cli: &Cli) -> Result<InspectConfig> {
    let path = cli.config.clone().or_else(default_config_path);

    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .wrap_err_with(|| format!("Failed to read config {}", path.display()))?;
            toml::from_str::<InspectConfig>(&text)
                .wrap_err_with(|| format!("Invalid config {}", path.display()))?
        }
        None => InspectConfig::default(),
    };

    if let Some(score_log) = &cli.score_log {
        config.score_log = score_log.clone();
    }
    if let Some(compiler) = &cli.compiler {
        config.compiler = compiler.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.compile_timeout_secs = timeout;
    }
    if cli.no_prompt {
        config.prompt = false;
    }

    config.validate().map_err(|e| eyre!("Invalid configuration: {e}"))?;
    Ok(config)
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("filegrade").join("config.toml"))
        .filter(|path| path.is_file())
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match (quiet, verbose) {
            (true, _) => tracing_subscriber::EnvFilter::new("error"),
            (false, 0) => tracing_subscriber::EnvFilter::new("warn"),
            (false, 1) => tracing_subscriber::EnvFilter::new("info"),
            (false, 2) => tracing_subscriber::EnvFilter::new("debug"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
