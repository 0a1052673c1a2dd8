//! Adapters for the platform around the containers API.
//!
//! Everything here talks to the outside world through narrow seams so the
//! orchestration in [`crate::api`] can be tested without a `cf` CLI or a
//! logged-in session:
//!
//! - [`CommandRunner`] runs external commands (the `cf` CLI).
//! - [`auth`] reads the bearer token and space GUID from the local `cf`
//!   credential file.
//! - [`endpoints`] discovers the control-plane and container API URLs.
//! - [`inspect`] queries, polls, and removes groups.
//! - [`services`] locates and binds platform services in the current space.

pub mod auth;
pub mod endpoints;
pub mod inspect;
pub mod services;

use std::process::Command;

use tracing::debug;

use crate::error::PlatformError;

/// Captured result of an external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, or `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Returns whether the command exited with status zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Convert a non-zero exit into [`PlatformError::ExternalCommandFailed`].
    ///
    /// # Errors
    ///
    /// Returns `ExternalCommandFailed` when the command did not succeed.
    pub fn into_success(self, program: &str, args: &[String]) -> Result<Self, PlatformError> {
        if self.success() {
            return Ok(self);
        }
        Err(PlatformError::ExternalCommandFailed {
            command: command_line(program, args),
            code: self.code.unwrap_or(-1),
            stderr: self.stderr.trim().to_owned(),
        })
    }
}

/// Behaviour required to run external commands.
///
/// This abstraction exists to keep the `cf` CLI adapters testable without the
/// CLI installed.
pub trait CommandRunner {
    /// Run `program` with `args` to completion, capturing its output.
    ///
    /// A non-zero exit is reported through [`CommandOutput::code`], not as an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::CommandSpawnFailed`] if the process cannot be
    /// started.
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, PlatformError>;
}

/// Production [`CommandRunner`] backed by [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, PlatformError> {
        debug!(command = %command_line(program, args), "running external command");
        let output = Command::new(program).args(args).output().map_err(|error| {
            PlatformError::CommandSpawnFailed {
                command: command_line(program, args),
                message: error.to_string(),
            }
        })?;

        let captured = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(
            command = %command_line(program, args),
            code = ?captured.code,
            stdout = %captured.stdout,
            stderr = %captured.stderr,
            "external command finished"
        );
        Ok(captured)
    }
}

/// Render a command line for logs and error messages.
#[must_use]
pub fn command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build an owned argument vector from string literals.
#[must_use]
pub fn owned_args(args: &[&str]) -> Vec<String> {
    args.iter().map(|arg| (*arg).to_owned()).collect()
}

#[cfg(test)]
pub(crate) mod testing;
