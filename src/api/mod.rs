//! Orchestration API for icgroup commands.
//!
//! This module provides one public function per `icgroup` subcommand:
//! [`create_group`], [`inspect_group`], [`wait_for_group`],
//! [`remove_group`], [`show_endpoints`], [`remaining_wait`] and
//! [`service_credentials`]. They hold the sequencing the CLI binary would
//! otherwise carry, so library embedders can drive the same flows.
//!
//! All functions accept library-owned types (not clap types) and return
//! [`crate::error::Result<CommandOutcome>`]. They do not print to
//! stdout/stderr or call `std::process::exit`.

mod create;
mod credentials;
mod group;

use std::time::{Duration, Instant};

pub use create::{CreateParams, create_group};
pub use credentials::{CredentialsRequest, service_credentials};
pub use group::{inspect_group, remaining_wait, remove_group, show_endpoints, wait_for_group};

use crate::config::{AppConfig, TimingConfig};
use crate::platform::CommandRunner;
use crate::platform::inspect::PollPolicy;

const SECONDS_PER_MINUTE: u64 = 60;

/// Outcome of an icgroup command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command completed; `output` is the text to show the user.
    Completed {
        /// Text produced by the command.
        output: String,
    },
    /// A dry run built the creation request without contacting the platform.
    DryRun {
        /// The wire body that would have been submitted.
        body: String,
    },
}

impl CommandOutcome {
    /// Text the CLI prints for this outcome.
    #[must_use]
    pub fn output(&self) -> &str {
        match self {
            Self::Completed { output } => output,
            Self::DryRun { body } => body,
        }
    }

    fn completed(output: impl Into<String>) -> Self {
        Self::Completed {
            output: output.into(),
        }
    }
}

/// Per-invocation state shared by every command.
///
/// Built once per process run: the start instant anchors the wait budget,
/// and the runner and environment are the seams to the `cf` CLI and the
/// process environment.
pub struct InvocationContext<'a, R: CommandRunner, E: mockable::Env> {
    config: &'a AppConfig,
    runner: &'a R,
    env: &'a E,
    started: Instant,
}

impl<'a, R: CommandRunner, E: mockable::Env> InvocationContext<'a, R, E> {
    /// Create a context whose wait budget starts now.
    #[must_use]
    pub fn new(config: &'a AppConfig, runner: &'a R, env: &'a E) -> Self {
        Self::started_at(config, runner, env, Instant::now())
    }

    /// Create a context whose wait budget started at `started`.
    #[must_use]
    pub const fn started_at(
        config: &'a AppConfig,
        runner: &'a R,
        env: &'a E,
        started: Instant,
    ) -> Self {
        Self {
            config,
            runner,
            env,
            started,
        }
    }

    /// The merged configuration.
    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        self.config
    }

    /// The `cf` executable to run.
    #[must_use]
    pub fn cf_binary(&self) -> &str {
        self.config.cf_binary()
    }

    /// Seconds of wait budget left at this moment.
    #[must_use]
    pub fn remaining_wait(&self) -> Duration {
        WaitBudget::from(&self.config.timing).remaining(self.started.elapsed())
    }

    const fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            initial_wait: Duration::from_secs(self.config.timing.initial_poll_secs),
            retry_interval: Duration::from_secs(self.config.timing.poll_interval_secs),
        }
    }
}

/// How long a pipeline stage may still wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitBudget {
    total: Duration,
    already_spent: Duration,
}

impl WaitBudget {
    /// Budget of `total`, of which `already_spent` was consumed before this
    /// process started.
    #[must_use]
    pub const fn new(total: Duration, already_spent: Duration) -> Self {
        Self {
            total,
            already_spent,
        }
    }

    /// Time left after `elapsed` has passed in this process, clamped at zero.
    ///
    /// A zero budget means waiting is disabled and stays zero.
    #[must_use]
    pub const fn remaining(&self, elapsed: Duration) -> Duration {
        if self.total.is_zero() {
            return Duration::ZERO;
        }
        self.total
            .saturating_sub(self.already_spent)
            .saturating_sub(elapsed)
    }
}

impl From<&TimingConfig> for WaitBudget {
    fn from(timing: &TimingConfig) -> Self {
        Self::new(
            Duration::from_secs(timing.wait_time_minutes.saturating_mul(SECONDS_PER_MINUTE)),
            Duration::from_secs(timing.init_time_secs),
        )
    }
}
