//! Scenario state and test doubles for group lifecycle behavioural tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use icgroup::api::CommandOutcome;
use icgroup::config::AppConfig;
use icgroup::error::PlatformError;
use icgroup::platform::inspect::Sleeper;
use icgroup::platform::{CommandOutput, CommandRunner, command_line};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;

/// One canned reply from the fake `cf` CLI.
#[derive(Debug, Clone)]
pub(crate) struct Reply {
    pub(crate) code: i32,
    pub(crate) stdout: String,
}

/// High-level outcome from an orchestration call.
#[derive(Debug, Clone)]
pub(crate) enum LifecycleResult {
    /// Orchestration returned a `CommandOutcome`.
    Ok(CommandOutcome),
    /// Orchestration returned an error.
    Err(String),
}

#[derive(Default, ScenarioState)]
pub(crate) struct LifecycleState {
    pub(crate) config: Slot<AppConfig>,
    pub(crate) replies: Slot<Vec<Reply>>,
    pub(crate) calls: Slot<Vec<String>>,
    pub(crate) naps: Slot<Vec<Duration>>,
    pub(crate) result: Slot<LifecycleResult>,
}

#[fixture]
pub(crate) fn lifecycle_state() -> LifecycleState {
    let state = LifecycleState::default();
    state.config.set(AppConfig::default());
    state.replies.set(Vec::new());
    state
}

/// `cf` stand-in replaying scripted replies.
pub(crate) struct FakeCf {
    replies: RefCell<VecDeque<Reply>>,
    calls: RefCell<Vec<String>>,
}

impl FakeCf {
    pub(crate) fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for FakeCf {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, PlatformError> {
        let line = command_line(program, args);
        self.calls.borrow_mut().push(line.clone());
        let reply = self
            .replies
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| PlatformError::CommandSpawnFailed {
                command: line,
                message: String::from("no scripted reply left"),
            })?;
        Ok(CommandOutput {
            code: Some(reply.code),
            stdout: reply.stdout,
            stderr: String::from("scripted failure"),
        })
    }
}

/// Sleeper recording requested naps.
#[derive(Default)]
pub(crate) struct NapLog {
    naps: RefCell<Vec<Duration>>,
}

impl NapLog {
    pub(crate) fn naps(&self) -> Vec<Duration> {
        self.naps.borrow().clone()
    }
}

impl Sleeper for NapLog {
    fn sleep(&self, duration: Duration) {
        self.naps.borrow_mut().push(duration);
    }
}
