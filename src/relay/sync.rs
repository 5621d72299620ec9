//! Presence-checked file transfer to the device
//!
//! `upload_if_missing` only asks whether the remote path exists. Contents are
//! never compared, so a changed local artifact with the same name is not
//! uploaded again while the stale copy is still on the device.

use super::CommandExecutor;
use crate::error::{BenchError, Result, UploadStage};
use std::path::Path;
use tracing::{debug, instrument};

/// What `upload_if_missing` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The remote path already existed
    Skipped,
    /// The file was pushed (and marked executable when requested)
    Uploaded,
}

/// File operations on the device filesystem
pub struct RemoteFileSync<'a> {
    executor: &'a dyn CommandExecutor,
}

impl<'a> RemoteFileSync<'a> {
    pub fn new(executor: &'a dyn CommandExecutor) -> Self {
        Self { executor }
    }

    /// Push `local` to `remote` unless the remote path is already listed.
    ///
    /// # Errors
    ///
    /// Returns `BenchError::Upload` with the failing stage (`push` or
    /// `chmod`), or `BenchError::Io` when the relay cannot be spawned.
    #[instrument(skip(self), fields(local = %local.display()))]
    pub async fn upload_if_missing(
        &self,
        local: &Path,
        remote: &str,
        executable: bool,
    ) -> Result<SyncOutcome> {
        let listed = self
            .executor
            .execute(&["ls".to_string(), remote.to_string()], true)
            .await?;
        if listed.success() {
            debug!(remote = %remote, "Remote file present, skipping upload");
            return Ok(SyncOutcome::Skipped);
        }

        self.push(local, remote).await?;

        if executable {
            let chmod = self
                .executor
                .execute(
                    &["chmod".to_string(), "u+x".to_string(), remote.to_string()],
                    true,
                )
                .await?;
            if !chmod.success() {
                return Err(BenchError::upload(
                    UploadStage::Chmod,
                    remote,
                    chmod.stderr_text().trim(),
                ));
            }
        }

        Ok(SyncOutcome::Uploaded)
    }

    /// Push `local` to `remote` unconditionally
    pub async fn push(&self, local: &Path, remote: &str) -> Result<()> {
        let argv = self
            .executor
            .relay()
            .push_command(&local.to_string_lossy(), remote);
        let pushed = self.executor.execute(&argv, false).await?;
        if pushed.success() {
            debug!(remote = %remote, "Pushed file to device");
            Ok(())
        } else {
            Err(BenchError::upload(
                UploadStage::Push,
                local.to_string_lossy(),
                pushed.stderr_text().trim(),
            ))
        }
    }

    /// Create a remote directory and its parents
    pub async fn make_dir(&self, remote: &str) -> Result<()> {
        let created = self
            .executor
            .execute(
                &["mkdir".to_string(), "-p".to_string(), remote.to_string()],
                true,
            )
            .await?;
        if created.success() {
            Ok(())
        } else {
            Err(BenchError::upload(
                UploadStage::Mkdir,
                remote,
                created.stderr_text().trim(),
            ))
        }
    }

    /// Remove a remote path, returning whether the device reported success
    pub async fn remove(&self, remote: &str, recursive: bool) -> Result<bool> {
        let mut argv = vec!["rm".to_string()];
        if recursive {
            argv.push("-r".to_string());
        }
        argv.push(remote.to_string());
        let removed = self.executor.execute(&argv, true).await?;
        Ok(removed.success())
    }
}
