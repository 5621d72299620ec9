//! Configuration types for benchmark workloads
//!
//! The testbench consumes an already-parsed [`BenchConfig`]. Loading it from a
//! YAML document is provided as a convenience for the CLI.

use crate::error::{BenchError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default thread counts swept by the generic runner
pub const DEFAULT_THREADS: &[u32] = &[4];
/// Default execution targets swept by the generic runner
pub const DEFAULT_TARGETS: &[ExecutionTarget] = &[ExecutionTarget::Cpu];
/// Default run count passed to the generic runner
pub const DEFAULT_GENERIC_LOOPS: u32 = 10;
/// Default number of vendor executor invocations
pub const DEFAULT_VENDOR_LOOPS: u32 = 1;
/// Default report path
pub const DEFAULT_OUTPUT_FILE: &str = "results.json";
/// Default local directory holding the benchmark binaries
pub const DEFAULT_BINARIES_DIR: &str = "binaries";

/// Compute unit the generic runner is pinned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionTarget {
    /// Plain CPU kernels (no delegate flag)
    Cpu,
    /// GPU delegate
    Gpu,
    /// Android NNAPI delegate
    Nnapi,
}

impl ExecutionTarget {
    /// Runner flag selecting this target, if any
    #[must_use]
    pub fn runner_flag(self) -> Option<&'static str> {
        match self {
            Self::Cpu => None,
            Self::Gpu => Some("--use_gpu=true"),
            Self::Nnapi => Some("--use_nnapi=true"),
        }
    }
}

impl std::fmt::Display for ExecutionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Gpu => write!(f, "gpu"),
            Self::Nnapi => write!(f, "nnapi"),
        }
    }
}

/// Accelerated backend requested from the vendor executor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Accelerator {
    #[serde(alias = "gpu", alias = "GPU")]
    Gpu,
    #[serde(alias = "cpu", alias = "CPU")]
    Cpu,
}

impl Accelerator {
    /// Compute-device name understood by the vendor executor
    #[must_use]
    pub fn compute_device(self) -> &'static str {
        match self {
            Self::Gpu => "GpuAcc",
            Self::Cpu => "CpuAcc",
        }
    }
}

/// Settings shared by every workload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Where the JSON report is written
    #[serde(
        default = "default_output_file",
        alias = "outputFile",
        alias = "outputfile"
    )]
    pub output_file: PathBuf,

    /// Local directory whose files are staged as device binaries
    #[serde(default = "default_binaries_dir", alias = "binaries")]
    pub binaries_dir: PathBuf,

    /// Device selector passed to the relay tool (`-s SERIAL`)
    #[serde(default, alias = "serial")]
    pub device_serial: Option<String>,
}

fn default_output_file() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_FILE)
}

fn default_binaries_dir() -> PathBuf {
    PathBuf::from(DEFAULT_BINARIES_DIR)
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_file: default_output_file(),
            binaries_dir: default_binaries_dir(),
            device_serial: None,
        }
    }
}

/// Parameter sweep for the generic tensor-graph runner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericRunnerConfig {
    #[serde(default)]
    pub threads: Option<Vec<u32>>,
    #[serde(default, alias = "options")]
    pub targets: Option<Vec<ExecutionTarget>>,
    #[serde(default)]
    pub loops: Option<u32>,
}

impl GenericRunnerConfig {
    /// Configured thread counts, or the documented default
    #[must_use]
    pub fn resolved_threads(&self) -> Vec<u32> {
        self.threads
            .clone()
            .unwrap_or_else(|| DEFAULT_THREADS.to_vec())
    }

    /// Configured execution targets, or the documented default
    #[must_use]
    pub fn resolved_targets(&self) -> Vec<ExecutionTarget> {
        self.targets
            .clone()
            .unwrap_or_else(|| DEFAULT_TARGETS.to_vec())
    }

    /// Configured run count, or the documented default
    #[must_use]
    pub fn resolved_loops(&self) -> u32 {
        self.loops.unwrap_or(DEFAULT_GENERIC_LOOPS)
    }
}

/// Invocation settings for the vendor executor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorExecutorConfig {
    #[serde(default)]
    pub input_shape: Option<Vec<usize>>,
    #[serde(default)]
    pub input_name: Option<String>,
    #[serde(default)]
    pub output_name: Option<String>,
    #[serde(default)]
    pub loops: Option<u32>,
    #[serde(default)]
    pub concurrent: Option<bool>,
    #[serde(default)]
    pub quantized: Option<bool>,
    #[serde(default)]
    pub fp16: Option<bool>,
    #[serde(default)]
    pub accelerator: Option<Accelerator>,
}

/// Tensor description required before the vendor executor can run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorSpec {
    pub input_shape: Vec<usize>,
    pub input_name: String,
    pub output_name: String,
}

impl TensorSpec {
    /// Number of scalar values in the input tensor
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.input_shape.iter().product()
    }
}

impl VendorExecutorConfig {
    /// Configured invocation count, or the documented default
    #[must_use]
    pub fn resolved_loops(&self) -> u32 {
        self.loops.unwrap_or(DEFAULT_VENDOR_LOOPS)
    }

    /// Extract the mandatory tensor fields
    ///
    /// # Errors
    ///
    /// Returns `BenchError::Config` when the input shape or either tensor name
    /// is missing.
    pub fn tensor_spec(&self) -> Result<TensorSpec> {
        let input_shape = self
            .input_shape
            .clone()
            .ok_or_else(|| BenchError::config("Input shape required on vendor executor"))?;
        let (Some(input_name), Some(output_name)) = (&self.input_name, &self.output_name) else {
            return Err(BenchError::config(
                "Input and output tensor names required on vendor executor",
            ));
        };
        Ok(TensorSpec {
            input_shape,
            input_name: input_name.clone(),
            output_name: output_name.clone(),
        })
    }
}

/// One named benchmarking task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkloadConfig {
    #[serde(default)]
    pub model: Option<PathBuf>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "tflite")]
    pub generic: Option<GenericRunnerConfig>,
    #[serde(default, alias = "armnn")]
    pub vendor: Option<VendorExecutorConfig>,
}

impl WorkloadConfig {
    /// Create a workload for the given model artifact
    pub fn new<P: Into<PathBuf>>(model: P) -> Self {
        Self {
            model: Some(model.into()),
            ..Self::default()
        }
    }

    /// Local model path
    ///
    /// # Errors
    ///
    /// Returns `BenchError::Config` when the workload has no model.
    pub fn model_path(&self) -> Result<&Path> {
        self.model
            .as_deref()
            .ok_or_else(|| BenchError::config("Model option not found"))
    }

    /// Base file name of the model artifact, used as the remote file name
    pub fn model_file_name(&self) -> Result<String> {
        let path = self.model_path()?;
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                BenchError::config(format!("Model path '{}' has no file name", path.display()))
            })
    }

    /// Report key: the configured name or the model's base file name
    pub fn display_name(&self) -> Result<String> {
        match &self.name {
            Some(name) => Ok(name.clone()),
            None => self.model_file_name(),
        }
    }
}

/// Parsed configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchConfig {
    #[serde(default)]
    pub global: GlobalConfig,
    pub workloads: Vec<WorkloadConfig>,
}

impl BenchConfig {
    /// Parse a configuration document from YAML text
    ///
    /// # Errors
    ///
    /// Returns `BenchError::Serialization` for malformed documents, including
    /// a document without a `workloads` list.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Read and parse a configuration document from disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }
}

/// Remote filesystem layout and binary names on the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceLayout {
    /// Directory holding uploaded models and the synthetic input
    pub model_dir: String,
    /// Directory holding the benchmark binaries and their libraries
    pub binaries_dir: String,
    /// File name of the generic runner binary
    pub generic_binary: String,
    /// File name of the vendor executor binary
    pub vendor_binary: String,
    /// File name of the synthetic vendor input on the device
    pub input_file: String,
}

impl Default for DeviceLayout {
    fn default() -> Self {
        Self {
            model_dir: "/data/local/tmp/models/".to_string(),
            binaries_dir: "/data/local/tmp/binaries/".to_string(),
            generic_binary: "benchmark_model".to_string(),
            vendor_binary: "ExecuteNetwork".to_string(),
            input_file: "intemp".to_string(),
        }
    }
}

fn join_remote(dir: &str, file: &str) -> String {
    format!("{}/{}", dir.trim_end_matches('/'), file)
}

impl DeviceLayout {
    #[must_use]
    pub fn model_path(&self, model_name: &str) -> String {
        join_remote(&self.model_dir, model_name)
    }

    #[must_use]
    pub fn binary_path(&self, binary_name: &str) -> String {
        join_remote(&self.binaries_dir, binary_name)
    }

    #[must_use]
    pub fn generic_binary_path(&self) -> String {
        self.binary_path(&self.generic_binary)
    }

    #[must_use]
    pub fn vendor_binary_path(&self) -> String {
        self.binary_path(&self.vendor_binary)
    }

    #[must_use]
    pub fn input_path(&self) -> String {
        join_remote(&self.model_dir, &self.input_file)
    }
}
