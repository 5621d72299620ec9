//! Parsing of captured engine outputs

mod common;

use common::{GENERIC_OUTPUT, VENDOR_OUTPUT};
use ml_testbench::{BenchError, EmbeddedJsonParser, RunAggregator, TableOutputParser};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn test_generic_runner_profile_table() {
    let table = TableOutputParser::parse(GENERIC_OUTPUT).unwrap();

    let names: Vec<&str> = table.layers.iter().map(|l| l.layer.as_str()).collect();
    assert_eq!(
        names,
        vec!["CONV_2D", "DEPTHWISE_CONV_2D", "CONV_2D", "AVERAGE_POOL_2D", "SOFTMAX"]
    );
    assert_close(table.layers[0].time, 2.790);
    assert_close(table.layers[4].time, 0.063);
    // Rows of the "Top by Computation Time" table are not part of the result
    assert_close(table.total, 2.790 + 1.487 + 3.054 + 0.079 + 0.063);
}

#[test]
fn test_generic_runner_failure_output() {
    let output = "STARTING!\nFailed to allocate tensors!\nBenchmarking failed.\n";
    assert!(matches!(
        TableOutputParser::parse(output),
        Err(BenchError::TableNotFound)
    ));
}

#[test]
fn test_truncated_generic_output() {
    // Output cut off before the closing separator
    let truncated: String = GENERIC_OUTPUT
        .lines()
        .take_while(|line| !line.contains("Top by Computation Time"))
        .collect::<Vec<_>>()
        .join("\n");
    assert!(matches!(
        TableOutputParser::parse(&truncated),
        Err(BenchError::TableNotFound)
    ));
}

#[test]
fn test_vendor_embedded_report() {
    let result = EmbeddedJsonParser::parse(VENDOR_OUTPUT).unwrap();

    assert_eq!(result.source, "vendor");
    assert!(result.threads.is_none());
    assert_close(result.mean_time, 18.441);
    let layers: Vec<(&str, f64)> = result
        .times
        .iter()
        .map(|t| (t.layer.as_str(), t.time))
        .collect();
    assert_eq!(layers.len(), 3);
    assert_eq!(layers[0].0, "RefConvolution2dWorkload_Execute_#3");
    assert_close(layers[0].1, 12.21);
    assert_eq!(layers[2].0, "RefSoftmaxWorkload_Execute_#5");
    assert_close(layers[2].1, 1.18);
}

#[test]
fn test_vendor_output_without_report() {
    let output = "Info: ArmNN v20.08.0\nError: Failed to load network\n";
    let err = EmbeddedJsonParser::parse(output).unwrap_err();
    assert!(err.is_parse_failure());
}

#[test]
fn test_repeated_vendor_runs_average_to_single_run() {
    let runs = vec![
        EmbeddedJsonParser::parse(VENDOR_OUTPUT).unwrap(),
        EmbeddedJsonParser::parse(VENDOR_OUTPUT).unwrap(),
        EmbeddedJsonParser::parse(VENDOR_OUTPUT).unwrap(),
    ];
    let combined = RunAggregator::combine(&runs).unwrap();
    assert_close(combined.mean_time, runs[0].mean_time);
    for (combined, single) in combined.times.iter().zip(&runs[0].times) {
        assert_eq!(combined.layer, single.layer);
        assert_close(combined.time, single.time);
    }
}
