//! Workload orchestration
//!
//! Drives every configured workload against the device strictly one command
//! at a time. The device is a single shared resource and concurrent
//! invocations would distort each other's timings, so nothing here runs in
//! parallel. The remote directories are also only safe under this serial
//! access pattern.

use crate::{
    aggregate::RunAggregator,
    config::{BenchConfig, DeviceLayout, GenericRunnerConfig, VendorExecutorConfig, WorkloadConfig},
    drivers::{GenericRunnerDriver, VendorExecutorDriver},
    error::Result,
    parsers::{EmbeddedJsonParser, TableOutputParser},
    relay::{CommandExecutor, RemoteFileSync, SyncOutcome},
    services::{BenchStage, NoOpProgressReporter, ProgressReporter, ProgressUpdate},
    tracing_config::spans,
    types::{BenchmarkResult, Report},
};
use log::info;
use std::path::Path;
use tracing::{debug, error, warn, Instrument};
use walkdir::WalkDir;

static NO_PROGRESS: NoOpProgressReporter = NoOpProgressReporter;

/// Position of the workload being processed, for progress updates
#[derive(Debug, Clone, Copy)]
struct Cursor {
    index: usize,
    total: usize,
}

/// Runs the configured benchmark sweeps and assembles the report
pub struct WorkloadOrchestrator<'a> {
    executor: &'a dyn CommandExecutor,
    layout: DeviceLayout,
    progress: &'a dyn ProgressReporter,
}

impl<'a> WorkloadOrchestrator<'a> {
    pub fn new(executor: &'a dyn CommandExecutor) -> Self {
        Self {
            executor,
            layout: DeviceLayout::default(),
            progress: &NO_PROGRESS,
        }
    }

    #[must_use]
    pub fn with_layout(mut self, layout: DeviceLayout) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: &'a dyn ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn layout(&self) -> &DeviceLayout {
        &self.layout
    }

    /// Benchmark every workload and return the collected results.
    ///
    /// Failures of single combinations, vendor runs or workload configs are
    /// logged and skipped. Remote cleanup is best effort.
    ///
    /// # Errors
    ///
    /// Fails only when the benchmark binaries cannot be staged, before any
    /// workload runs.
    pub async fn run(&self, config: &BenchConfig) -> Result<Report> {
        let total = config.workloads.len();
        self.progress
            .report_progress(ProgressUpdate::new(BenchStage::BinaryStaging, 0, total));
        self.stage_binaries(&config.global.binaries_dir)
            .instrument(spans::remote_sync(&self.layout.binaries_dir))
            .await?;

        let mut report = Report::new();
        for (index, workload) in config.workloads.iter().enumerate() {
            let cursor = Cursor { index, total };
            match self.run_workload(workload, cursor).await {
                Ok((name, results)) => {
                    self.progress.report_progress(
                        ProgressUpdate::new(BenchStage::WorkloadCompleted, index, total)
                            .with_workload(name.as_str())
                            .with_detail(format!("{} result(s)", results.len())),
                    );
                    report.insert(name, results);
                },
                Err(e) => {
                    error!(workload = index, error = %e, "Skipping workload");
                    self.progress
                        .report_error(BenchStage::WorkloadConfig, &e.to_string());
                },
            }
        }

        self.progress
            .report_progress(ProgressUpdate::new(BenchStage::Cleanup, total, total));
        self.cleanup().await;
        self.progress
            .report_progress(ProgressUpdate::new(BenchStage::Completed, total, total));
        Ok(report)
    }

    /// Upload every local benchmark binary and create the remote directories
    async fn stage_binaries(&self, local_dir: &Path) -> Result<()> {
        if !local_dir.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("binaries directory '{}' not found", local_dir.display()),
            )
            .into());
        }

        let sync = RemoteFileSync::new(self.executor);
        sync.make_dir(&self.layout.binaries_dir).await?;

        let entries = WalkDir::new(local_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();
        for entry in entries {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy();
            let remote = self.layout.binary_path(&file_name);
            let outcome = sync.upload_if_missing(entry.path(), &remote, true).await?;
            debug!(binary = %file_name, ?outcome, "Staged binary");
        }

        sync.make_dir(&self.layout.model_dir).await
    }

    async fn run_workload(
        &self,
        workload: &WorkloadConfig,
        cursor: Cursor,
    ) -> Result<(String, Vec<BenchmarkResult>)> {
        let model_path = workload.model_path()?;
        let model_name = workload.model_file_name()?;
        let name = workload.display_name()?;

        async {
            info!("Running workload {}", name);
            self.progress.report_progress(
                ProgressUpdate::new(BenchStage::ModelUpload, cursor.index, cursor.total)
                    .with_workload(name.as_str()),
            );

            let sync = RemoteFileSync::new(self.executor);
            match sync
                .upload_if_missing(model_path, &self.layout.model_path(&model_name), false)
                .await
            {
                Ok(SyncOutcome::Skipped) => debug!("Model already on device"),
                Ok(SyncOutcome::Uploaded) => debug!("Model uploaded"),
                Err(e) => {
                    error!(error = %e, "Model upload failed, skipping benchmarks");
                    self.progress
                        .report_error(BenchStage::ModelUpload, &e.to_string());
                    return Ok((name.clone(), Vec::new()));
                },
            }

            let mut results = Vec::new();
            if let Some(generic) = &workload.generic {
                info!("Executing with generic runner");
                results.extend(self.run_generic(generic, &model_name, &name, cursor).await);
            }
            if let Some(vendor) = &workload.vendor {
                info!("Executing with vendor executor");
                if let Some(result) = self.run_vendor(vendor, &model_name, &name, cursor).await {
                    results.push(result);
                }
            }
            Ok((name.clone(), results))
        }
        .instrument(spans::workload(&name, &model_name))
        .await
    }

    /// Sweep threads x targets, keeping every combination that succeeds
    async fn run_generic(
        &self,
        config: &GenericRunnerConfig,
        model_name: &str,
        workload: &str,
        cursor: Cursor,
    ) -> Vec<BenchmarkResult> {
        let driver = GenericRunnerDriver::new(self.executor, &self.layout);
        let loops = config.resolved_loops();
        let mut results = Vec::new();

        for threads in config.resolved_threads() {
            for target in config.resolved_targets() {
                let tag = format!("{target}_{threads}Threads");
                let outcome = async {
                    let raw = driver.run(model_name, target, threads, loops).await?;
                    TableOutputParser::parse(&raw)
                }
                .instrument(spans::generic_run(&tag))
                .await;

                match outcome {
                    Ok(table) => {
                        self.progress.report_progress(
                            ProgressUpdate::new(BenchStage::GenericRun, cursor.index, cursor.total)
                                .with_workload(workload)
                                .with_detail(tag.as_str()),
                        );
                        results.push(
                            BenchmarkResult::new(tag, table.total, table.layers).with_threads(threads),
                        );
                    },
                    Err(e) => {
                        warn!(combination = %tag, error = %e, "Generic runner combination failed");
                        self.progress
                            .report_error(BenchStage::GenericRun, &format!("{tag}: {e}"));
                    },
                }
            }
        }
        results
    }

    /// Run the vendor executor loops and average the parsable outputs
    async fn run_vendor(
        &self,
        config: &VendorExecutorConfig,
        model_name: &str,
        workload: &str,
        cursor: Cursor,
    ) -> Option<BenchmarkResult> {
        let driver = VendorExecutorDriver::new(self.executor, &self.layout);
        let outputs = match driver
            .run(config, model_name)
            .instrument(spans::vendor_run(config.resolved_loops()))
            .await
        {
            Ok(outputs) => outputs,
            Err(e) => {
                warn!(error = %e, "Vendor executor branch aborted");
                self.progress.report_error(BenchStage::VendorRun, &e.to_string());
                return None;
            },
        };

        let parsed: Vec<BenchmarkResult> = outputs
            .iter()
            .enumerate()
            .filter_map(|(iteration, raw)| match EmbeddedJsonParser::parse(raw) {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!(iteration, error = %e, "Could not parse vendor output");
                    None
                },
            })
            .collect();

        let combined = RunAggregator::combine(&parsed);
        if combined.is_some() {
            self.progress.report_progress(
                ProgressUpdate::new(BenchStage::VendorRun, cursor.index, cursor.total)
                    .with_workload(workload)
                    .with_detail(format!("{} of {} run(s) parsed", parsed.len(), outputs.len())),
            );
        } else {
            warn!("No vendor run produced a parsable report");
        }
        combined
    }

    /// Remove the remote binaries and model directories, logging failures
    async fn cleanup(&self) {
        let sync = RemoteFileSync::new(self.executor);
        for dir in [&self.layout.binaries_dir, &self.layout.model_dir] {
            match sync.remove(dir, true).await {
                Ok(true) => debug!(path = %dir, "Removed remote directory"),
                Ok(false) => {
                    warn!(path = %dir, "Could not remove remote directory");
                    self.progress
                        .report_error(BenchStage::Cleanup, &format!("rm -r {dir} failed"));
                },
                Err(e) => {
                    warn!(path = %dir, error = %e, "Could not remove remote directory");
                    self.progress.report_error(BenchStage::Cleanup, &e.to_string());
                },
            }
        }
    }
}
