//! Progress reporting service
//!
//! The orchestrator emits [`ProgressUpdate`]s; frontends decide how to show
//! them.

use tracing::{info, warn};

/// Stages of an orchestration run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchStage {
    /// Uploading benchmark binaries and creating remote directories
    BinaryStaging,
    /// Resolving a workload's own settings, such as its model path
    WorkloadConfig,
    /// Uploading a workload's model artifact
    ModelUpload,
    /// One generic runner parameter combination
    GenericRun,
    /// The vendor executor branch of a workload
    VendorRun,
    /// All branches of a workload finished
    WorkloadCompleted,
    /// Removing remote directories
    Cleanup,
    /// Report assembled
    Completed,
}

impl BenchStage {
    /// Get a human-readable description of the stage
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            BenchStage::BinaryStaging => "Uploading benchmark binaries",
            BenchStage::WorkloadConfig => "Reading workload settings",
            BenchStage::ModelUpload => "Uploading model",
            BenchStage::GenericRun => "Running generic benchmark",
            BenchStage::VendorRun => "Running vendor benchmark",
            BenchStage::WorkloadCompleted => "Workload completed",
            BenchStage::Cleanup => "Cleaning up device",
            BenchStage::Completed => "Benchmarking completed",
        }
    }
}

/// Progress update for a stage, optionally tied to a workload
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub stage: BenchStage,
    /// Workload name, when the stage belongs to one
    pub workload: Option<String>,
    /// Extra detail such as a result tag
    pub detail: Option<String>,
    /// Zero-based workload position
    pub workload_index: usize,
    pub workload_total: usize,
}

impl ProgressUpdate {
    #[must_use]
    pub fn new(stage: BenchStage, workload_index: usize, workload_total: usize) -> Self {
        Self {
            stage,
            workload: None,
            detail: None,
            workload_index,
            workload_total,
        }
    }

    #[must_use]
    pub fn with_workload<S: Into<String>>(mut self, workload: S) -> Self {
        self.workload = Some(workload.into());
        self
    }

    #[must_use]
    pub fn with_detail<S: Into<String>>(mut self, detail: S) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Trait for receiving orchestration progress
pub trait ProgressReporter: Send + Sync {
    /// Report a progress update
    fn report_progress(&self, update: ProgressUpdate);

    /// Report a non-fatal error at a stage
    fn report_error(&self, stage: BenchStage, error: &str);
}

/// No-op progress reporter that discards all progress updates
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn report_progress(&self, _update: ProgressUpdate) {}

    fn report_error(&self, _stage: BenchStage, _error: &str) {}
}

/// Reporter writing progress as tracing events
pub struct LogProgressReporter;

impl ProgressReporter for LogProgressReporter {
    fn report_progress(&self, update: ProgressUpdate) {
        info!(
            stage = update.stage.description(),
            workload = update.workload.as_deref().unwrap_or("-"),
            detail = update.detail.as_deref().unwrap_or(""),
            "[{}/{}]",
            (update.workload_index + 1).min(update.workload_total),
            update.workload_total
        );
    }

    fn report_error(&self, stage: BenchStage, error: &str) {
        warn!(stage = stage.description(), error = %error, "Stage failed");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Reporter recording updates for assertions
    #[derive(Default)]
    pub(crate) struct RecordingReporter {
        pub(crate) updates: Mutex<Vec<ProgressUpdate>>,
        pub(crate) errors: Mutex<Vec<(BenchStage, String)>>,
    }

    impl ProgressReporter for RecordingReporter {
        fn report_progress(&self, update: ProgressUpdate) {
            self.updates.lock().unwrap().push(update);
        }

        fn report_error(&self, stage: BenchStage, error: &str) {
            self.errors.lock().unwrap().push((stage, error.to_string()));
        }
    }

    #[test]
    fn test_update_builder() {
        let update = ProgressUpdate::new(BenchStage::GenericRun, 0, 2)
            .with_workload("mobilenet")
            .with_detail("cpu_4Threads");
        assert_eq!(update.workload.as_deref(), Some("mobilenet"));
        assert_eq!(update.detail.as_deref(), Some("cpu_4Threads"));
        assert_eq!(update.stage.description(), "Running generic benchmark");
    }

    #[test]
    fn test_recording_reporter() {
        let reporter = RecordingReporter::default();
        reporter.report_progress(ProgressUpdate::new(BenchStage::Cleanup, 0, 1));
        reporter.report_error(BenchStage::Cleanup, "rm failed");
        assert_eq!(reporter.updates.lock().unwrap().len(), 1);
        assert_eq!(reporter.errors.lock().unwrap()[0].1, "rm failed");
    }
}
