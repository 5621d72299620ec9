//! Timing records and the final report

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;

/// Elapsed time of one layer, in the engine's native timer units
#[derive(Debug, Clone, PartialEq, serde::Serialize, Deserialize)]
pub struct LayerTiming {
    pub layer: String,
    pub time: f64,
}

impl LayerTiming {
    pub fn new<S: Into<String>>(layer: S, time: f64) -> Self {
        Self {
            layer: layer.into(),
            time,
        }
    }
}

/// Timing record of one engine/backend/thread combination
#[derive(Debug, Clone, PartialEq, serde::Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Engine, backend and thread combination (e.g. `cpu_4Threads`, `vendor`)
    #[serde(rename = "type")]
    pub source: String,
    /// Aggregate time. For the generic runner this is the sum of the layer
    /// times even though the report calls it a mean.
    pub mean_time: f64,
    /// Per-layer timings in engine order
    pub times: Vec<LayerTiming>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<u32>,
}

impl BenchmarkResult {
    pub fn new<S: Into<String>>(source: S, mean_time: f64, times: Vec<LayerTiming>) -> Self {
        Self {
            source: source.into(),
            mean_time,
            times,
            threads: None,
        }
    }

    #[must_use]
    pub fn with_threads(mut self, threads: u32) -> Self {
        self.threads = Some(threads);
        self
    }
}

/// Workload name to results, in execution order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    entries: Vec<(String, Vec<BenchmarkResult>)>,
}

impl Report {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the results of a workload.
    ///
    /// A name seen before keeps its position and has its results replaced.
    pub fn insert<S: Into<String>>(&mut self, name: S, results: Vec<BenchmarkResult>) {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(key, _)| *key == name) {
            entry.1 = results;
        } else {
            self.entries.push((name, results));
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[BenchmarkResult]> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, results)| results.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[BenchmarkResult])> {
        self.entries
            .iter()
            .map(|(name, results)| (name.as_str(), results.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, results) in &self.entries {
            map.serialize_entry(name, results)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_preserves_insertion_order() {
        let mut report = Report::new();
        report.insert("zeta", vec![]);
        report.insert("alpha", vec![BenchmarkResult::new("vendor", 1.0, vec![])]);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.find("zeta").unwrap() < json.find("alpha").unwrap());
    }

    #[test]
    fn test_report_replaces_repeated_name_in_place() {
        let mut report = Report::new();
        report.insert("a", vec![]);
        report.insert("b", vec![]);
        report.insert("a", vec![BenchmarkResult::new("vendor", 2.0, vec![])]);

        let names: Vec<&str> = report.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(report.get("a").unwrap().len(), 1);
    }

    #[test]
    fn test_result_serialization_shape() {
        let result = BenchmarkResult::new("cpu_4Threads", 3.5, vec![LayerTiming::new("CONV_2D", 3.5)])
            .with_threads(4);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["type"], "cpu_4Threads");
        assert_eq!(value["threads"], 4);
        assert_eq!(value["times"][0]["layer"], "CONV_2D");

        let vendor = serde_json::to_value(BenchmarkResult::new("vendor", 1.0, vec![])).unwrap();
        assert!(vendor.get("threads").is_none());
    }
}
