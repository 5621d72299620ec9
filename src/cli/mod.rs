//! CLI module for the ml-testbench binary
//!
//! This module is only available when the "cli" feature is enabled.

#[path = "main.rs"]
mod main_impl;
mod progress;

pub use main_impl::{main, run, Cli, USAGE_EXIT_CODE};
