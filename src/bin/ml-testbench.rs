//! ML Testbench CLI Tool
//!
//! Benchmarks compiled inference models on an attached device through `adb`.

#[cfg(feature = "cli")]
use ml_testbench::cli;

#[cfg(feature = "cli")]
#[tokio::main(flavor = "current_thread")]
async fn main() -> std::process::ExitCode {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}
