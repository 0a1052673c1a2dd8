//! Configuration system for icgroup.
//!
//! This module provides the configuration structures and CLI definitions for the
//! icgroup application. Configuration loading and precedence merging is handled by
//! the `ortho_config` crate. Precedence: CLI flags override environment
//! variables, which override configuration files, which override defaults.
//!
//! The configuration file is expected at `~/.config/icgroup/config.toml` by default.
//!
//! # Example Configuration
//!
//! ```toml
//! cf_binary = "/usr/local/bin/cf"
//!
//! [logging]
//! debug = false
//! pipeline_enabled = true
//! pipeline_file = "/var/log/pipeline/icgroup.log"
//!
//! [timing]
//! wait_time_minutes = 5
//! init_time_secs = 0
//! initial_poll_secs = 10
//! poll_interval_secs = 20
//!
//! [platform]
//! setup_service_space = false
//! api_port = 8443
//! ```

mod cli;
mod loader;
mod types;

#[cfg(test)]
mod tests;

pub use cli::{Cli, Commands, CreateArgs, GroupNameArgs, ServiceCredentialsArgs};
pub use loader::{env_var_names, load_config, load_config_with_env};
pub use types::{AppConfig, DEFAULT_CF_BINARY, LoggingConfig, PlatformConfig, TimingConfig};
