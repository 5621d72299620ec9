//! Progress bar frontend for orchestration progress

use crate::services::{BenchStage, LogProgressReporter, ProgressReporter, ProgressUpdate};
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;

/// Renders workload progress with an `indicatif` bar, or logs it when the bar
/// is disabled
pub(crate) struct BarProgressReporter {
    bar: Option<ProgressBar>,
    fallback: LogProgressReporter,
}

impl BarProgressReporter {
    pub(crate) fn new(workloads: usize, enabled: bool) -> Self {
        let bar = enabled.then(|| {
            let bar = ProgressBar::new(workloads as u64);
            let style = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .map(|style| style.progress_chars("#>-"))
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            bar.set_style(style);
            bar
        });
        Self {
            bar,
            fallback: LogProgressReporter,
        }
    }

    pub(crate) fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl ProgressReporter for BarProgressReporter {
    fn report_progress(&self, update: ProgressUpdate) {
        let Some(bar) = &self.bar else {
            self.fallback.report_progress(update);
            return;
        };

        let message = match (&update.workload, &update.detail) {
            (Some(workload), Some(detail)) => {
                format!("{}: {} ({})", update.stage.description(), workload, detail)
            },
            (Some(workload), None) => format!("{}: {}", update.stage.description(), workload),
            _ => update.stage.description().to_string(),
        };
        bar.set_message(message);

        match update.stage {
            BenchStage::WorkloadCompleted => bar.inc(1),
            BenchStage::Completed => bar.set_position(update.workload_total as u64),
            _ => bar.tick(),
        }
    }

    fn report_error(&self, stage: BenchStage, error: &str) {
        match &self.bar {
            Some(bar) => {
                bar.suspend(|| warn!("{}: {}", stage.description(), error));
            },
            None => self.fallback.report_error(stage, error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_counts_completed_workloads() {
        let reporter = BarProgressReporter::new(3, true);
        reporter.report_progress(ProgressUpdate::new(BenchStage::ModelUpload, 0, 3).with_workload("a"));
        reporter.report_progress(
            ProgressUpdate::new(BenchStage::WorkloadCompleted, 0, 3).with_workload("a"),
        );
        reporter.report_progress(
            ProgressUpdate::new(BenchStage::WorkloadCompleted, 1, 3)
                .with_workload("b")
                .with_detail("2 result(s)"),
        );

        let bar = reporter.bar.as_ref().unwrap();
        assert_eq!(bar.position(), 2);
        assert_eq!(bar.message(), "Workload completed: b (2 result(s))");

        reporter.report_progress(ProgressUpdate::new(BenchStage::Completed, 3, 3));
        assert_eq!(bar.position(), 3);
        reporter.finish();
    }

    #[test]
    fn test_disabled_bar_falls_back_to_logging() {
        let reporter = BarProgressReporter::new(1, false);
        assert!(reporter.bar.is_none());
        reporter.report_progress(ProgressUpdate::new(BenchStage::Cleanup, 1, 1));
        reporter.report_error(BenchStage::Cleanup, "rm failed");
        reporter.finish();
    }
}
