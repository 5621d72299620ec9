//! Command relay to the benchmark device
//!
//! Every device interaction goes through a [`CommandExecutor`]. Commands run
//! one at a time and each call blocks until the child exits; no timeout is
//! enforced, so a hung device command stalls the caller.

pub mod sync;

#[cfg(test)]
pub(crate) mod test_utils;

pub use self::sync::{RemoteFileSync, SyncOutcome};

use crate::error::Result;
use async_trait::async_trait;
use tracing::trace;

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit status, `-1` when the child was terminated by a signal
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout decoded lossily as text
    #[must_use]
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Stderr decoded lossily as text
    #[must_use]
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Device bridge program and device selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayTool {
    pub program: String,
    pub serial: Option<String>,
}

impl Default for RelayTool {
    fn default() -> Self {
        Self {
            program: "adb".to_string(),
            serial: None,
        }
    }
}

impl RelayTool {
    #[must_use]
    pub fn with_serial(mut self, serial: Option<String>) -> Self {
        self.serial = serial;
        self
    }

    fn base(&self) -> Vec<String> {
        let mut argv = vec![self.program.clone()];
        if let Some(serial) = &self.serial {
            argv.push("-s".to_string());
            argv.push(serial.clone());
        }
        argv
    }

    /// Prefix turning an argv into a device shell invocation
    #[must_use]
    pub fn shell_prefix(&self) -> Vec<String> {
        let mut argv = self.base();
        argv.push("shell".to_string());
        argv
    }

    /// Local command copying a file onto the device
    #[must_use]
    pub fn push_command(&self, local: &str, remote: &str) -> Vec<String> {
        let mut argv = self.base();
        argv.push("push".to_string());
        argv.push(local.to_string());
        argv.push(remote.to_string());
        argv
    }
}

/// Runs local or relayed commands
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Relay settings used to build device-side commands
    fn relay(&self) -> &RelayTool;

    /// Run `argv`, prefixed with the relay shell form when `via_relay` is set.
    ///
    /// A nonzero exit is reported through [`CommandOutput::exit_code`], never
    /// as an error.
    ///
    /// # Errors
    ///
    /// Returns `BenchError::Io` only when the process cannot be spawned.
    async fn execute(&self, argv: &[String], via_relay: bool) -> Result<CommandOutput>;
}

/// Executor spawning real child processes
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor {
    relay: RelayTool,
}

impl ProcessExecutor {
    #[must_use]
    pub fn new(relay: RelayTool) -> Self {
        Self { relay }
    }
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    fn relay(&self) -> &RelayTool {
        &self.relay
    }

    async fn execute(&self, argv: &[String], via_relay: bool) -> Result<CommandOutput> {
        let full: Vec<String> = if via_relay {
            self.relay
                .shell_prefix()
                .into_iter()
                .chain(argv.iter().cloned())
                .collect()
        } else {
            argv.to_vec()
        };
        let Some((program, args)) = full.split_first() else {
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command").into());
        };

        trace!(command = %full.join(" "), "Spawning command");
        let output = tokio::process::Command::new(program)
            .args(args)
            .output()
            .await?;

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
