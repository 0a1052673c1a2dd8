//! Group inspection, status polling, and removal through `cf ic group`.

use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{info, warn};

use super::{CommandRunner, owned_args};
use crate::error::PlatformError;

/// Status reported while the platform is still provisioning a group.
pub const CREATE_IN_PROGRESS: &str = "CREATE_IN_PROGRESS";

const DEFAULT_INITIAL_WAIT_SECS: u64 = 10;
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 20;

/// Abstraction over blocking sleeps so polling can be tested instantly.
pub trait Sleeper {
    /// Block the current thread for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Production [`Sleeper`] using [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Fixed waits used while polling a group's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Wait before the first inspection.
    pub initial_wait: Duration,
    /// Wait between inspections, and before the single retry after a failed
    /// inspection.
    pub retry_interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_wait: Duration::from_secs(DEFAULT_INITIAL_WAIT_SECS),
            retry_interval: Duration::from_secs(DEFAULT_RETRY_INTERVAL_SECS),
        }
    }
}

/// The JSON document printed by `cf ic group inspect`.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDocument {
    value: Value,
}

impl GroupDocument {
    /// Parse `cf ic group inspect` output.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::MalformedOutput`] unless the output is a JSON
    /// object.
    pub fn parse(command: &str, raw: &str) -> Result<Self, PlatformError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|error| PlatformError::MalformedOutput {
                command: command.to_owned(),
                message: error.to_string(),
            })?;
        if !value.is_object() {
            return Err(PlatformError::MalformedOutput {
                command: command.to_owned(),
                message: String::from("expected a JSON object"),
            });
        }
        Ok(Self { value })
    }

    /// Wrap an already-parsed document.
    #[must_use]
    pub const fn from_value(value: Value) -> Self {
        Self { value }
    }

    /// The group's `Status` field, if present and a string.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.value.get("Status").and_then(Value::as_str)
    }

    /// Whether the platform is still creating the group.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.status() == Some(CREATE_IN_PROGRESS)
    }

    /// The raw JSON value.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.value
    }

    /// Render as indented JSON with keys sorted at every level.
    #[must_use]
    pub fn to_pretty_json(&self) -> String {
        sorted_pretty_json(&self.value)
    }
}

/// Render any JSON value indented, with keys sorted at every level.
#[must_use]
pub fn sorted_pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(&canonical(value)).unwrap_or_else(|_| value.to_string())
}

fn canonical(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            let mut sorted = Map::new();
            for key in keys {
                if let Some(child) = map.get(key) {
                    sorted.insert(key.clone(), canonical(child));
                }
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical).collect()),
        other => other.clone(),
    }
}

/// `cf ic group` operations for a single CLI binary.
pub struct GroupClient<'a, R: CommandRunner> {
    runner: &'a R,
    cf_binary: &'a str,
}

impl<'a, R: CommandRunner> GroupClient<'a, R> {
    /// Create a client that runs `cf_binary` through `runner`.
    #[must_use]
    pub const fn new(runner: &'a R, cf_binary: &'a str) -> Self {
        Self { runner, cf_binary }
    }

    /// Inspect `name` once.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::ExternalCommandFailed`] when the CLI exits
    /// non-zero and [`PlatformError::MalformedOutput`] when it prints
    /// something other than a JSON object.
    pub fn inspect(&self, name: &str) -> Result<GroupDocument, PlatformError> {
        let args = owned_args(&["ic", "group", "inspect", name]);
        let output = self
            .runner
            .run(self.cf_binary, &args)?
            .into_success(self.cf_binary, &args)?;
        GroupDocument::parse(&super::command_line(self.cf_binary, &args), &output.stdout)
    }

    /// Poll `name` until it leaves [`CREATE_IN_PROGRESS`].
    ///
    /// Waits `policy.initial_wait` before the first inspection, then
    /// `policy.retry_interval` between inspections. Within one poll cycle a
    /// single failed inspection is retried after another interval; a second
    /// consecutive failure is returned. A failure of the very first
    /// inspection is returned immediately. There is no overall deadline.
    ///
    /// # Errors
    ///
    /// Returns the inspection error that ended polling.
    pub fn wait_until_settled<S: Sleeper>(
        &self,
        sleeper: &S,
        policy: PollPolicy,
        name: &str,
    ) -> Result<GroupDocument, PlatformError> {
        sleeper.sleep(policy.initial_wait);
        let mut document = self.inspect(name)?;
        info!(group = name, status = ?document.status(), "group inspected");

        while document.is_transient() {
            sleeper.sleep(policy.retry_interval);
            document = match self.inspect(name) {
                Ok(next) => next,
                Err(error @ PlatformError::ExternalCommandFailed { .. }) => {
                    warn!(group = name, %error, "inspect failed, retrying once");
                    sleeper.sleep(policy.retry_interval);
                    self.inspect(name)?
                }
                Err(error) => return Err(error),
            };
            info!(group = name, status = ?document.status(), "group inspected");
        }

        Ok(document)
    }

    /// Force-remove `name`, returning the CLI's output.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::ExternalCommandFailed`] when the CLI exits
    /// non-zero.
    pub fn remove(&self, name: &str) -> Result<String, PlatformError> {
        let args = owned_args(&["ic", "group", "rm", "--force", name]);
        let output = self
            .runner
            .run(self.cf_binary, &args)?
            .into_success(self.cf_binary, &args)?;
        info!(group = name, "group removed");
        Ok(output.stdout)
    }
}
