//! Vendor neural-network executor driver
//!
//! Each workload run writes a fresh synthetic input tensor, pushes it to the
//! device, and invokes the executor once per loop. The first failing
//! invocation stops the remaining ones.

use crate::config::{DeviceLayout, TensorSpec, VendorExecutorConfig};
use crate::error::{BenchError, Result};
use crate::relay::{CommandExecutor, RemoteFileSync};
use ndarray::{ArrayD, IxDyn};
use rand::Rng;
use std::io::{BufWriter, Write};
use tracing::{debug, info, instrument, warn};

/// Write `element_count` pseudo-random values in `[0, 1)`, one per line
pub fn write_synthetic_input<W: Write>(writer: W, spec: &TensorSpec) -> Result<()> {
    let mut rng = rand::thread_rng();
    let tensor = ArrayD::<f32>::from_shape_simple_fn(IxDyn(&spec.input_shape), || rng.gen());

    let mut writer = BufWriter::new(writer);
    for value in &tensor {
        writeln!(writer, "{value}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Invokes the vendor executor binary on the device
pub struct VendorExecutorDriver<'a> {
    executor: &'a dyn CommandExecutor,
    layout: &'a DeviceLayout,
}

impl<'a> VendorExecutorDriver<'a> {
    pub fn new(executor: &'a dyn CommandExecutor, layout: &'a DeviceLayout) -> Self {
        Self { executor, layout }
    }

    /// Device-side command line for one invocation
    #[must_use]
    pub fn command(
        &self,
        config: &VendorExecutorConfig,
        spec: &TensorSpec,
        model_name: &str,
    ) -> Vec<String> {
        let mut argv = vec![
            "export".to_string(),
            format!("LD_LIBRARY_PATH={}", self.layout.binaries_dir),
            "&&".to_string(),
            self.layout.vendor_binary_path(),
        ];
        let switches = [
            (config.concurrent, "-n"),
            (config.quantized, "-q"),
            (config.fp16, "-h"),
        ];
        argv.extend(
            switches
                .iter()
                .filter(|(enabled, _)| enabled.unwrap_or(false))
                .map(|(_, flag)| (*flag).to_string()),
        );
        argv.extend(["-e", "-f", "tflite-binary", "-m"].map(str::to_string));
        argv.push(self.layout.model_path(model_name));
        argv.push("-i".to_string());
        argv.push(spec.input_name.clone());
        argv.push("-o".to_string());
        argv.push(spec.output_name.clone());
        if let Some(accelerator) = config.accelerator {
            argv.push("-c".to_string());
            argv.push(accelerator.compute_device().to_string());
        }
        argv.extend(["-c", "CpuRef", "-d"].map(str::to_string));
        argv.push(self.layout.input_path());
        argv
    }

    /// Run the executor `loops` times and return each invocation's stdout.
    ///
    /// # Errors
    ///
    /// Returns `BenchError::Config` before touching the device when the tensor
    /// fields are missing, `BenchError::Upload` when the input cannot be
    /// pushed, and `BenchError::Execution` for the first failed invocation.
    #[instrument(skip(self, config))]
    pub async fn run(&self, config: &VendorExecutorConfig, model_name: &str) -> Result<Vec<String>> {
        let spec = config.tensor_spec()?;

        let input = tempfile::NamedTempFile::new()?;
        write_synthetic_input(input.as_file(), &spec)?;
        let remote_input = self.layout.input_path();
        let sync = RemoteFileSync::new(self.executor);
        sync.push(input.path(), &remote_input).await?;
        debug!(elements = spec.element_count(), "Synthetic input uploaded");

        let outcome = self.invoke_loops(config, &spec, model_name).await;
        self.remove_input(&sync, &remote_input).await;
        outcome
    }

    async fn invoke_loops(
        &self,
        config: &VendorExecutorConfig,
        spec: &TensorSpec,
        model_name: &str,
    ) -> Result<Vec<String>> {
        let argv = self.command(config, spec, model_name);
        let loops = config.resolved_loops();
        let mut outputs = Vec::with_capacity(loops as usize);

        for iteration in 1..=loops {
            let output = self.executor.execute(&argv, true).await?;
            if !output.success() {
                warn!(iteration, loops, "Vendor executor failed, aborting remaining loops");
                return Err(BenchError::execution(&argv, output.exit_code, &output.stderr));
            }
            info!(iteration, loops, "Vendor executor run finished");
            outputs.push(output.stdout_text());
        }
        Ok(outputs)
    }

    async fn remove_input(&self, sync: &RemoteFileSync<'_>, remote_input: &str) {
        match sync.remove(remote_input, false).await {
            Ok(true) => {},
            Ok(false) => warn!(path = %remote_input, "Could not remove synthetic input"),
            Err(e) => warn!(path = %remote_input, error = %e, "Could not remove synthetic input"),
        }
    }
}
