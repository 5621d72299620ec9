//! Generic tensor-graph runner driver

use crate::config::{DeviceLayout, ExecutionTarget};
use crate::error::{BenchError, Result};
use crate::relay::CommandExecutor;
use crate::tracing_config::events;
use instant::Instant;
use tracing::instrument;

/// Invokes the generic runner binary on the device
pub struct GenericRunnerDriver<'a> {
    executor: &'a dyn CommandExecutor,
    layout: &'a DeviceLayout,
}

impl<'a> GenericRunnerDriver<'a> {
    pub fn new(executor: &'a dyn CommandExecutor, layout: &'a DeviceLayout) -> Self {
        Self { executor, layout }
    }

    /// Device-side argument list for one run
    #[must_use]
    pub fn command(
        &self,
        model_name: &str,
        target: ExecutionTarget,
        threads: u32,
        loops: u32,
    ) -> Vec<String> {
        let mut argv = vec![
            self.layout.generic_binary_path(),
            format!("--graph={}", self.layout.model_path(model_name)),
            format!("--num_runs={loops}"),
            format!("--num_threads={threads}"),
            "--enable_op_profiling=true".to_string(),
        ];
        if let Some(flag) = target.runner_flag() {
            argv.push(flag.to_string());
        }
        argv
    }

    /// Run the benchmark and return its stdout.
    ///
    /// # Errors
    ///
    /// Returns `BenchError::Execution` carrying stderr on a nonzero exit.
    #[instrument(skip(self))]
    pub async fn run(
        &self,
        model_name: &str,
        target: ExecutionTarget,
        threads: u32,
        loops: u32,
    ) -> Result<String> {
        let argv = self.command(model_name, target, threads, loops);
        let started = Instant::now();
        let output = self.executor.execute(&argv, true).await?;
        events::run_timing(
            &self.layout.generic_binary,
            started.elapsed().as_millis() as u64,
            output.exit_code,
        );

        if output.success() {
            Ok(output.stdout_text())
        } else {
            Err(BenchError::execution(&argv, output.exit_code, &output.stderr))
        }
    }
}
