//! Shared fixtures for integration tests: captured engine outputs and an
//! in-memory device reachable through the relay interface

#![allow(dead_code)]

use async_trait::async_trait;
use ml_testbench::{CommandExecutor, CommandOutput, RelayTool, Result};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Mutex;

pub const GENERIC_OUTPUT: &str = include_str!("../assets/generic_runner_output.txt");
pub const VENDOR_OUTPUT: &str = include_str!("../assets/vendor_executor_output.txt");

fn ok(stdout: &str) -> CommandOutput {
    CommandOutput {
        exit_code: 0,
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
    }
}

fn fail(exit_code: i32, stderr: &str) -> CommandOutput {
    CommandOutput {
        exit_code,
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

fn normalize(path: &str) -> String {
    path.trim_end_matches('/').to_string()
}

/// Device emulation keeping a set of remote paths and answering the engine
/// binaries with captured outputs
#[derive(Default)]
pub struct FakeDevice {
    relay: RelayTool,
    files: Mutex<BTreeSet<String>>,
    pushes: Mutex<Vec<String>>,
    commands: Mutex<Vec<Vec<String>>>,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend `remote` already exists on the device
    pub fn with_file(self, remote: &str) -> Self {
        self.files.lock().unwrap().insert(normalize(remote));
        self
    }

    pub fn has_file(&self, remote: &str) -> bool {
        self.files.lock().unwrap().contains(&normalize(remote))
    }

    pub fn files(&self) -> Vec<String> {
        self.files.lock().unwrap().iter().cloned().collect()
    }

    /// Remote destinations of every push, in order
    pub fn pushes(&self) -> Vec<String> {
        self.pushes.lock().unwrap().clone()
    }

    /// Device-side commands whose program ends with `name`. Vendor runs are
    /// wrapped in `export LD_LIBRARY_PATH=.. &&`, so their program is argv[3].
    pub fn invocations_of(&self, name: &str) -> Vec<Vec<String>> {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .filter(|argv| {
                let program = match argv.first().map(String::as_str) {
                    Some("export") => argv.get(3),
                    _ => argv.first(),
                };
                program.is_some_and(|program| program.ends_with(name))
            })
            .cloned()
            .collect()
    }

    fn shell(&self, argv: &[String]) -> CommandOutput {
        self.commands.lock().unwrap().push(argv.to_vec());
        let mut files = self.files.lock().unwrap();
        match argv.first().map(String::as_str) {
            Some("ls") => match argv.get(1) {
                Some(path) if files.contains(&normalize(path)) => ok(path),
                _ => fail(1, "No such file or directory"),
            },
            Some("mkdir") => {
                if let Some(path) = argv.last() {
                    files.insert(normalize(path));
                }
                ok("")
            },
            Some("chmod") => match argv.last() {
                Some(path) if files.contains(&normalize(path)) => ok(""),
                _ => fail(1, "No such file or directory"),
            },
            Some("rm") => {
                if let Some(path) = argv.last() {
                    let root = normalize(path);
                    files.retain(|file| file != &root && !file.starts_with(&format!("{root}/")));
                }
                ok("")
            },
            Some("export") => {
                let binary = argv.get(3).map(|path| normalize(path)).unwrap_or_default();
                let input_present = argv
                    .windows(2)
                    .any(|pair| pair[0] == "-d" && files.contains(&normalize(&pair[1])));
                if !files.contains(&binary) {
                    fail(127, "ExecuteNetwork: not found")
                } else if !input_present {
                    fail(1, "Failed to read input data")
                } else {
                    ok(VENDOR_OUTPUT)
                }
            },
            Some(program) if files.contains(&normalize(program)) => ok(GENERIC_OUTPUT),
            Some(program) => fail(127, &format!("{program}: not found")),
            None => fail(1, "empty command"),
        }
    }

    fn local(&self, argv: &[String]) -> CommandOutput {
        let is_push = argv.iter().any(|token| token == "push");
        match (is_push, argv.last()) {
            (true, Some(remote)) => {
                self.pushes.lock().unwrap().push(remote.clone());
                self.files.lock().unwrap().insert(normalize(remote));
                ok("1 file pushed")
            },
            _ => fail(1, "unsupported local command"),
        }
    }
}

#[async_trait]
impl CommandExecutor for FakeDevice {
    fn relay(&self) -> &RelayTool {
        &self.relay
    }

    async fn execute(&self, argv: &[String], via_relay: bool) -> Result<CommandOutput> {
        Ok(if via_relay {
            self.shell(argv)
        } else {
            self.local(argv)
        })
    }
}

/// Create the staged binaries both engines need
pub fn write_binaries(dir: &Path) {
    for name in ["benchmark_model", "ExecuteNetwork", "libarmnn.so"] {
        std::fs::write(dir.join(name), b"\x7fELF").unwrap();
    }
}
