//! Configuration data types for icgroup.

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoResult, PostMergeContext, PostMergeHook};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

/// The `cf` executable used when none is configured.
pub const DEFAULT_CF_BINARY: &str = "cf";

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Emit debug-level output on stdout.
    pub debug: bool,

    /// Also append JSON records to [`Self::pipeline_file`].
    pub pipeline_enabled: bool,

    /// File receiving pipeline log records at info level and above.
    pub pipeline_file: Option<Utf8PathBuf>,
}

impl LoggingConfig {
    /// The pipeline log file, when pipeline logging is enabled and a file is
    /// configured.
    #[must_use]
    pub fn active_pipeline_file(&self) -> Option<&Utf8PathBuf> {
        self.pipeline_file
            .as_ref()
            .filter(|_| self.pipeline_enabled)
    }
}

/// Wait budget and polling cadence.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, SmartDefault)]
#[serde(default)]
pub struct TimingConfig {
    /// Total time a pipeline stage may spend waiting, in minutes.
    #[default = 5]
    pub wait_time_minutes: u64,

    /// Seconds already consumed by initialisation before this process ran.
    pub init_time_secs: u64,

    /// Seconds to wait before the first group inspection.
    #[default = 10]
    pub initial_poll_secs: u64,

    /// Seconds between group inspections.
    #[default = 20]
    pub poll_interval_secs: u64,
}

/// Platform access configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, SmartDefault)]
#[serde(default)]
pub struct PlatformConfig {
    /// Credential file; defaults to `~/.cf/config.json`.
    pub credentials_path: Option<Utf8PathBuf>,

    /// Create missing service instances, bindings, and keys on demand.
    pub setup_service_space: bool,

    /// Alternative CLI used to push the bridge application, when it exists.
    pub legacy_cli_path: Option<Utf8PathBuf>,

    /// Port of the containers API.
    #[default = 8443]
    pub api_port: u16,
}

/// Root application configuration.
///
/// This structure is loaded from configuration files, environment variables,
/// and command-line arguments with layered precedence. The precedence order
/// (lowest to highest) is: defaults, configuration file, environment variables,
/// command-line arguments.
///
/// Configuration files are discovered in this order:
/// 1. Path specified via `ICGROUP_CONFIG_PATH` environment variable
/// 2. `.icgroup.toml` in the current working directory
/// 3. `.icgroup.toml` in the home directory
/// 4. `~/.config/icgroup/config.toml` (XDG default)
#[derive(Debug, Clone, Default, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(
    prefix = "ICGROUP",
    post_merge_hook,
    discovery(
        app_name = "icgroup",
        env_var = "ICGROUP_CONFIG_PATH",
        config_file_name = "config.toml",
        dotfile_name = ".icgroup.toml",
        config_cli_long = "config",
        config_cli_visible = true,
    )
)]
pub struct AppConfig {
    /// The `cf` executable to run.
    pub cf_binary: Option<String>,

    /// Logging configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub logging: LoggingConfig,

    /// Wait budget and polling cadence.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub timing: TimingConfig,

    /// Platform access configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub platform: PlatformConfig,
}

impl AppConfig {
    /// The configured `cf` executable, or [`DEFAULT_CF_BINARY`].
    #[must_use]
    pub fn cf_binary(&self) -> &str {
        self.cf_binary.as_deref().unwrap_or(DEFAULT_CF_BINARY)
    }
}

impl PostMergeHook for AppConfig {
    fn post_merge(&mut self, _ctx: &PostMergeContext) -> OrthoResult<()> {
        // A blank binary name would make every `cf` call fail to spawn.
        self.cf_binary = self
            .cf_binary
            .take()
            .map(|binary| binary.trim().to_owned())
            .filter(|binary| !binary.is_empty());
        Ok(())
    }
}
