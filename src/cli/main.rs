//! ML Testbench CLI
//!
//! Loads a benchmark configuration, runs every workload on the attached
//! device and writes the JSON report.

use super::progress::BarProgressReporter;
use crate::{
    config::BenchConfig,
    error::BenchError,
    orchestrator::WorkloadOrchestrator,
    relay::{ProcessExecutor, RelayTool},
    services::ReportWriter,
    tracing_config::{events, init_cli_tracing, spans, TracingOutput},
};
use anyhow::{Context, Result};
use clap::{error::ErrorKind, Parser};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Instrument;

/// Exit status for usage errors and unreadable configuration files
pub const USAGE_EXIT_CODE: u8 = 128;
/// Exit status for malformed configuration and aborted runs
const FAILURE_EXIT_CODE: u8 = 1;

/// On-device inference benchmark orchestrator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "ml-testbench")]
pub struct Cli {
    /// Benchmark configuration document (YAML)
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Report path, overrides the configured output file
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Serial of the target device, for hosts with several devices attached
    #[arg(short, long)]
    pub serial: Option<String>,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log progress instead of drawing a progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Write logs to this file instead of stderr
    #[cfg(feature = "tracing-files")]
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Log destination selected on the command line
    pub fn tracing_output(&self) -> TracingOutput {
        #[cfg(feature = "tracing-files")]
        if let Some(path) = &self.log_file {
            return TracingOutput::File(path.clone());
        }
        TracingOutput::Console
    }
}

fn parse_failure_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => USAGE_EXIT_CODE,
    }
}

pub async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(parse_failure_code(e.kind()));
        },
    };

    let session_id = uuid::Uuid::new_v4().to_string();
    let _guard = match init_cli_tracing(cli.verbose, &session_id, cli.tracing_output()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: failed to initialize tracing: {e}");
            None
        },
    };

    ExitCode::from(
        run(&cli)
            .instrument(spans::session(&session_id, &cli.config))
            .await,
    )
}

/// Run the benchmarks described by `cli` and return the process exit status
pub async fn run(cli: &Cli) -> u8 {
    let mut config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(code) => return code,
    };
    if let Some(serial) = &cli.serial {
        config.global.device_serial = Some(serial.clone());
    }

    match execute(cli, &config).await {
        Ok(output) => {
            info!("Report written to {}", output.display());
            0
        },
        Err(e) => {
            events::error_with_context(e.as_ref(), "benchmark run");
            eprintln!("Error: {e:#}");
            FAILURE_EXIT_CODE
        },
    }
}

fn load_config(path: &Path) -> std::result::Result<BenchConfig, u8> {
    if !path.is_file() {
        error!("Configuration file '{}' does not exist", path.display());
        eprintln!("Error: configuration file '{}' does not exist", path.display());
        return Err(USAGE_EXIT_CODE);
    }

    match BenchConfig::from_file(path) {
        Ok(config) => Ok(config),
        Err(BenchError::Io(e)) => {
            eprintln!("Error: cannot read configuration '{}': {e}", path.display());
            Err(USAGE_EXIT_CODE)
        },
        Err(e) => {
            eprintln!("Error: invalid configuration '{}': {e}", path.display());
            Err(FAILURE_EXIT_CODE)
        },
    }
}

async fn execute(cli: &Cli, config: &BenchConfig) -> Result<PathBuf> {
    let relay = RelayTool::default().with_serial(config.global.device_serial.clone());
    let executor = ProcessExecutor::new(relay);
    let progress = BarProgressReporter::new(config.workloads.len(), !cli.no_progress);

    info!(
        "Benchmarking {} workload(s) from {}",
        config.workloads.len(),
        cli.config.display()
    );
    let outcome = WorkloadOrchestrator::new(&executor)
        .with_progress(&progress)
        .run(config)
        .await;
    progress.finish();
    let report = outcome.context("Benchmark run aborted")?;

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| config.global.output_file.clone());
    ReportWriter::write(&report, &output)
        .with_context(|| format!("Failed to write report to '{}'", output.display()))?;
    Ok(output)
}
