//! Scripted command executor for testing device interactions
//!
//! Replies are chosen by the first rule whose needle names one of the argv
//! tokens (exactly, or as the last path component); unmatched commands
//! succeed with empty output.

use super::{CommandExecutor, CommandOutput, RelayTool};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A command seen by the scripted executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedCall {
    pub(crate) argv: Vec<String>,
    pub(crate) via_relay: bool,
}

impl RecordedCall {
    pub(crate) fn command(&self) -> String {
        self.argv.join(" ")
    }

    pub(crate) fn has_token(&self, needle: &str) -> bool {
        token_matches(&self.argv, needle)
    }
}

fn token_matches(argv: &[String], needle: &str) -> bool {
    argv.iter()
        .any(|token| token == needle || token.rsplit('/').next() == Some(needle))
}

struct Rule {
    needle: String,
    responses: VecDeque<CommandOutput>,
    last: CommandOutput,
}

pub(crate) struct ScriptedExecutor {
    relay: RelayTool,
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<RecordedCall>>,
}

pub(crate) fn ok(stdout: &str) -> CommandOutput {
    CommandOutput {
        exit_code: 0,
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
    }
}

pub(crate) fn fail(exit_code: i32, stderr: &str) -> CommandOutput {
    CommandOutput {
        exit_code,
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

impl ScriptedExecutor {
    pub(crate) fn new() -> Self {
        Self {
            relay: RelayTool::default(),
            rules: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always answer commands containing `needle` with `output`
    pub(crate) fn on(self, needle: &str, output: CommandOutput) -> Self {
        self.on_sequence(needle, vec![output])
    }

    /// Answer successive matches in order, repeating the last reply
    pub(crate) fn on_sequence(self, needle: &str, outputs: Vec<CommandOutput>) -> Self {
        let mut responses: VecDeque<CommandOutput> = outputs.into();
        let last = responses.back().cloned().unwrap_or_default();
        responses.pop_back();
        self.rules.lock().unwrap().push(Rule {
            needle: needle.to_string(),
            responses,
            last,
        });
        self
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded commands with a token named `needle`
    pub(crate) fn calls_matching(&self, needle: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.has_token(needle))
            .collect()
    }
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    fn relay(&self) -> &RelayTool {
        &self.relay
    }

    async fn execute(&self, argv: &[String], via_relay: bool) -> Result<CommandOutput> {
        let call = RecordedCall {
            argv: argv.to_vec(),
            via_relay,
        };
        self.calls.lock().unwrap().push(call);

        let mut rules = self.rules.lock().unwrap();
        let reply = rules
            .iter_mut()
            .find(|rule| token_matches(argv, &rule.needle))
            .map(|rule| rule.responses.pop_front().unwrap_or_else(|| rule.last.clone()));
        Ok(reply.unwrap_or_else(|| ok("")))
    }
}
