#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # ML Testbench
//!
//! Automated on-device benchmarking of compiled inference models. The device
//! is reached only through a command relay (`adb`): files are pushed, commands
//! are run remotely and their stdout, stderr and exit code are read back.
//!
//! Two benchmark engines are driven across configured parameter sweeps:
//!
//! - **Generic runner** (`benchmark_model`): one run per thread count and
//!   execution target, with per-operator profiling parsed from a text table.
//! - **Vendor executor** (`ExecuteNetwork`): repeated runs fed with a
//!   synthetic input, each emitting a pretty-printed JSON report that is
//!   extracted, decoded and averaged across runs.
//!
//! Every engine output becomes a [`BenchmarkResult`] and all results are
//! collected into a [`Report`] keyed by workload name.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ml_testbench::{BenchConfig, ProcessExecutor, RelayTool, ReportWriter, WorkloadOrchestrator};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = BenchConfig::from_file("bench.yaml")?;
//! let executor = ProcessExecutor::new(RelayTool::default());
//!
//! let report = WorkloadOrchestrator::new(&executor).run(&config).await?;
//! ReportWriter::write(&report, &config.global.output_file)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): the `ml-testbench` binary, progress bars and tracing
//!   subscriber setup
//! - `tracing-json`: JSON formatted log output
//! - `tracing-files`: log output to a file
//!
//! Runs are strictly sequential. The device is one shared resource and
//! concurrent invocations would distort each other's timings.

pub mod aggregate;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod drivers;
pub mod error;
pub mod orchestrator;
pub mod parsers;
pub mod relay;
pub mod services;
pub mod tracing_config;
pub mod types;

// Public API exports
pub use aggregate::RunAggregator;
pub use config::{
    Accelerator, BenchConfig, DeviceLayout, ExecutionTarget, GenericRunnerConfig, GlobalConfig,
    TensorSpec, VendorExecutorConfig, WorkloadConfig,
};
pub use drivers::{GenericRunnerDriver, VendorExecutorDriver};
pub use error::{BenchError, Result, UploadStage};
pub use orchestrator::WorkloadOrchestrator;
pub use parsers::{EmbeddedJsonParser, ParsedTable, TableOutputParser};
pub use relay::{CommandExecutor, CommandOutput, ProcessExecutor, RelayTool, RemoteFileSync, SyncOutcome};
pub use services::{
    BenchStage, LogProgressReporter, NoOpProgressReporter, ProgressReporter, ProgressUpdate,
    ReportWriter,
};
pub use types::{BenchmarkResult, LayerTiming, Report};

pub use tracing_config::{events, spans, TracingConfig, TracingFormat, TracingGuard, TracingOutput};
#[cfg(feature = "cli")]
pub use tracing_config::init_cli_tracing;
