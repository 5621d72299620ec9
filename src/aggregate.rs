//! Averaging of repeated benchmark invocations

use crate::types::BenchmarkResult;
use tracing::warn;

/// Combines repeated runs of one engine on one model
pub struct RunAggregator;

impl RunAggregator {
    /// Average `results` elementwise.
    ///
    /// Every input is expected to list the same layers in the same order.
    /// This is not verified: layers are matched by position and the sums are
    /// divided by the number of inputs, so diverging runs yield a mismatched
    /// combination rather than an error.
    ///
    /// Returns `None` for an empty input.
    #[must_use]
    pub fn combine(results: &[BenchmarkResult]) -> Option<BenchmarkResult> {
        let (first, rest) = results.split_first()?;
        let mut combined = first.clone();

        for result in rest {
            if result.times.len() != combined.times.len() {
                warn!(
                    expected = combined.times.len(),
                    found = result.times.len(),
                    "Repeated run reported a different number of layers"
                );
            }
            combined.mean_time += result.mean_time;
            for (total, timing) in combined.times.iter_mut().zip(&result.times) {
                total.time += timing.time;
            }
        }

        let count = results.len() as f64;
        combined.mean_time /= count;
        for timing in &mut combined.times {
            timing.time /= count;
        }
        Some(combined)
    }
}
