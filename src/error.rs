//! Error types for benchmark orchestration

use thiserror::Error;

/// Result type alias for testbench operations
pub type Result<T> = std::result::Result<T, BenchError>;

/// Step of a remote transfer that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    /// Creating a remote directory
    Mkdir,
    /// Pushing the local file to the device
    Push,
    /// Marking the remote file executable
    Chmod,
}

impl std::fmt::Display for UploadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mkdir => write!(f, "mkdir"),
            Self::Push => write!(f, "push"),
            Self::Chmod => write!(f, "chmod"),
        }
    }
}

/// Error kinds raised while benchmarking on the device
#[derive(Error, Debug)]
pub enum BenchError {
    /// Local input/output errors (spawning the relay, temp files, report file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or invalid field in a workload or sub-config
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Remote list/push/chmod failed
    #[error("Upload of '{path}' failed at stage '{stage}': {detail}")]
    Upload {
        stage: UploadStage,
        path: String,
        detail: String,
    },

    /// Benchmark binary exited with a nonzero status
    #[error("Command '{command}' exited with status {exit_code}: {stderr}")]
    Execution {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    /// No profiling table found in the generic runner output
    #[error("Results table not found in benchmark output")]
    TableNotFound,

    /// Vendor output did not contain the expected embedded report
    #[error("Unexpected vendor report structure: {0}")]
    StructureMismatch(String),

    /// Report or configuration (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl BenchError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new upload error for the given stage
    pub fn upload<P: Into<String>, D: Into<String>>(stage: UploadStage, path: P, detail: D) -> Self {
        Self::Upload {
            stage,
            path: path.into(),
            detail: detail.into(),
        }
    }

    /// Create a new execution error from a failed command
    pub fn execution(argv: &[String], exit_code: i32, stderr: &[u8]) -> Self {
        Self::Execution {
            command: argv.join(" "),
            exit_code,
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
        }
    }

    /// Create a new structure mismatch error
    pub fn structure_mismatch<S: Into<String>>(msg: S) -> Self {
        Self::StructureMismatch(msg.into())
    }

    /// Whether this error is a parse failure of engine output
    #[must_use]
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Self::TableNotFound | Self::StructureMismatch(_))
    }
}

impl From<serde_json::Error> for BenchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for BenchError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
