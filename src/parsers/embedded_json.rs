//! Extraction of the JSON report embedded in vendor executor output
//!
//! Only the first character of each line is inspected when locating the
//! report: a line starting with `{` opens a level and a line starting with
//! `}` closes one. The engine pretty-prints its report with the outer braces
//! at column zero, and braces inside string values or on indented lines are
//! never counted.

use crate::error::{BenchError, Result};
use crate::types::{BenchmarkResult, LayerTiming};
use serde_json::{Map, Value};
use tracing::warn;

/// Top-level key of the vendor performance report
pub const REPORT_ROOT: &str = "ArmNN";
/// Execution record used for timings; the first execution is a warm-up
pub const EXECUTION_RECORD: &str = "Execute_#2";
/// Prefix of the whole-inference measurement inside the execution record
pub const WALL_CLOCK_PREFIX: &str = "Wall clock time";
/// Leading entries of the execution record that are not layers
pub const RESERVED_ENTRIES: usize = 4;
/// Source tag of vendor results
pub const VENDOR_SOURCE: &str = "vendor";

const MICROS_PER_MILLI: f64 = 1000.0;

/// Parser for the vendor executor's mixed text/JSON output
pub struct EmbeddedJsonParser;

impl EmbeddedJsonParser {
    /// Decode the embedded report into a timing record.
    ///
    /// # Errors
    ///
    /// Returns `BenchError::StructureMismatch` when no report is embedded, it
    /// is not valid JSON, or the expected nesting is absent.
    pub fn parse(raw: &str) -> Result<BenchmarkResult> {
        let buffer = Self::extract(raw);
        if buffer.is_empty() {
            return Err(BenchError::structure_mismatch("no embedded JSON report"));
        }

        let document: Value = serde_json::from_str(&buffer)
            .map_err(|e| BenchError::structure_mismatch(format!("invalid JSON report: {e}")))?;
        let root = document
            .get(REPORT_ROOT)
            .and_then(Value::as_object)
            .ok_or_else(|| BenchError::structure_mismatch(format!("missing '{REPORT_ROOT}'")))?;

        if root.len() > 1 {
            warn!(runs = root.len(), "More than one run in vendor report, using the first");
        }
        let run = root
            .values()
            .next()
            .and_then(Value::as_object)
            .ok_or_else(|| BenchError::structure_mismatch("vendor report holds no run"))?;
        let record = run
            .get(EXECUTION_RECORD)
            .and_then(Value::as_object)
            .ok_or_else(|| {
                BenchError::structure_mismatch(format!("execution '{EXECUTION_RECORD}' not found"))
            })?;

        Self::project(record)
    }

    /// Collect the lines of the embedded report
    fn extract(raw: &str) -> String {
        let mut depth: usize = 0;
        let mut buffer = String::new();
        for line in raw.lines() {
            if line.starts_with('{') {
                depth += 1;
            }
            if depth >= 1 {
                buffer.push_str(line);
                buffer.push('\n');
            }
            if line.starts_with('}') {
                depth = depth.saturating_sub(1);
            }
        }
        buffer
    }

    fn project(record: &Map<String, Value>) -> Result<BenchmarkResult> {
        let wall_clock = record
            .iter()
            .find(|(key, _)| key.starts_with(WALL_CLOCK_PREFIX))
            .and_then(|(_, measurement)| first_raw_sample(measurement))
            .ok_or_else(|| BenchError::structure_mismatch("missing wall clock measurement"))?;

        let times = record
            .iter()
            .skip(RESERVED_ENTRIES)
            .map(|(layer, event)| {
                event
                    .as_object()
                    .and_then(|entries| entries.values().nth(1))
                    .and_then(first_raw_sample)
                    .map(|sample| LayerTiming::new(layer.as_str(), sample / MICROS_PER_MILLI))
                    .ok_or_else(|| {
                        BenchError::structure_mismatch(format!("layer '{layer}' has no measurement"))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(BenchmarkResult::new(
            VENDOR_SOURCE,
            wall_clock / MICROS_PER_MILLI,
            times,
        ))
    }
}

fn first_raw_sample(measurement: &Value) -> Option<f64> {
    measurement.get("raw")?.get(0)?.as_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(runs: &str) -> String {
        format!(
            "ArmNN v20190800\nRunning network...\n{{\n\t\"ArmNN\": {{\n{runs}\n\t}}\n}}\nDone\n"
        )
    }

    const RUN: &str = r#"		"inference_measurements_#1": {
			"type": "Event",
			"Execute_#2": {
				"type": "Event",
				"Wall clock time_#2": {
					"type": "Measurement",
					"raw": [ 12500.0 ],
					"unit": "us"
				},
				"lid": 7,
				"guid": 9,
				"RefConvolution2dWorkload_Execute_#3": {
					"type": "Event",
					"Wall clock time_#3": {
						"type": "Measurement",
						"raw": [ 8000.0 ],
						"unit": "us"
					}
				},
				"RefSoftmaxWorkload_Execute_#4": {
					"type": "Event",
					"Wall clock time_#4": {
						"type": "Measurement",
						"raw": [ 500.0 ],
						"unit": "us"
					}
				}
			}
		}"#;

    #[test]
    fn test_projects_execution_record() {
        let result = EmbeddedJsonParser::parse(&report(RUN)).unwrap();
        assert_eq!(result.source, "vendor");
        assert!((result.mean_time - 12.5).abs() < 1e-12);
        assert_eq!(
            result.times,
            vec![
                LayerTiming::new("RefConvolution2dWorkload_Execute_#3", 8.0),
                LayerTiming::new("RefSoftmaxWorkload_Execute_#4", 0.5),
            ]
        );
        assert_eq!(result.threads, None);
    }

    #[test]
    fn test_no_json_is_structure_mismatch() {
        let err = EmbeddedJsonParser::parse("Error: failed to load network\n").unwrap_err();
        assert!(matches!(err, BenchError::StructureMismatch(_)));
    }

    #[test]
    fn test_missing_execution_record() {
        let run = r#"		"inference_measurements_#1": { "type": "Event" }"#;
        let err = EmbeddedJsonParser::parse(&report(run)).unwrap_err();
        assert!(err.to_string().contains("Execute_#2"));
    }

    #[test]
    fn test_first_of_several_runs_is_used() {
        let second = RUN
            .replace("inference_measurements_#1", "inference_measurements_#9")
            .replace("12500.0", "99000.0");
        let runs = format!("{RUN},\n{second}");
        let result = EmbeddedJsonParser::parse(&report(&runs)).unwrap();
        assert!((result.mean_time - 12.5).abs() < 1e-12);
    }

    #[test]
    fn test_braces_inside_indented_lines_are_not_counted() {
        let noisy = format!("{{ not json at top\n}}\n{}", report(RUN));
        // The stray block above is a separate top-level fragment and breaks decoding
        assert!(EmbeddedJsonParser::parse(&noisy).is_err());

        let with_text = report(RUN).replace("\"type\": \"Event\",\n\t\t\t\"Execute", "\"type\": \"Event {x}\",\n\t\t\t\"Execute");
        assert!(EmbeddedJsonParser::parse(&with_text).is_ok());
    }
}
