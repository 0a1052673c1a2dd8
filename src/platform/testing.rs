//! Test doubles shared by the platform adapters.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use super::inspect::Sleeper;
use super::{CommandOutput, CommandRunner, command_line};
use crate::error::PlatformError;

/// Runner that replays canned outputs in order and records every command line.
#[derive(Default)]
pub(crate) struct ScriptedRunner {
    replies: RefCell<VecDeque<Result<CommandOutput, PlatformError>>>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply with `stdout`.
    pub(crate) fn ok(self, stdout: &str) -> Self {
        self.exit(0, stdout, "")
    }

    /// Queue a reply with an explicit exit code.
    pub(crate) fn exit(self, code: i32, stdout: &str, stderr: &str) -> Self {
        self.replies.borrow_mut().push_back(Ok(CommandOutput {
            code: Some(code),
            stdout: stdout.to_owned(),
            stderr: stderr.to_owned(),
        }));
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, PlatformError> {
        let line = command_line(program, args);
        self.calls.borrow_mut().push(line.clone());
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected command: {line}"))
    }
}

/// Sleeper that records requested durations instead of blocking.
#[derive(Default)]
pub(crate) struct RecordingSleeper {
    naps: RefCell<Vec<Duration>>,
}

impl RecordingSleeper {
    pub(crate) fn naps(&self) -> Vec<Duration> {
        self.naps.borrow().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.naps.borrow_mut().push(duration);
    }
}
