//! Services separating side effects from the orchestration logic

pub mod progress;
pub mod report;

pub use self::progress::{
    BenchStage, LogProgressReporter, NoOpProgressReporter, ProgressReporter, ProgressUpdate,
};
pub use self::report::ReportWriter;
