//! Tracing subscriber installation.
//!
//! Human-readable records go to stdout at `DEBUG` when debugging is on and
//! `INFO` otherwise. When pipeline logging is enabled and a file is
//! configured, a JSON layer appends `INFO` and above to that file. `RUST_LOG`
//! replaces the stdout level when it is set.

use std::sync::Mutex;

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::{Dir, OpenOptions};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;
use crate::error::ConfigError;

/// Install the global subscriber described by `config`.
///
/// # Errors
///
/// Returns [`ConfigError::LoggingInit`] when the pipeline file cannot be
/// opened or a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    let stdout_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

    let pipeline_layer = config
        .active_pipeline_file()
        .map(|path| open_pipeline_file(path))
        .transpose()?
        .map(|file| {
            fmt::layer()
                .json()
                .with_writer(Mutex::new(file))
                .with_filter(LevelFilter::INFO)
        });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_filter(stdout_filter))
        .with(pipeline_layer)
        .try_init()
        .map_err(|error| ConfigError::LoggingInit {
            message: error.to_string(),
        })
}

/// The stdout level used when `RUST_LOG` is unset.
#[must_use]
pub const fn default_directive(config: &LoggingConfig) -> &'static str {
    if config.debug { "debug" } else { "info" }
}

/// Open `path` for appending, creating it when absent.
///
/// # Errors
///
/// Returns [`ConfigError::LoggingInit`] when the parent directory cannot be
/// opened or the file cannot be created.
pub fn open_pipeline_file(path: &Utf8Path) -> Result<std::fs::File, ConfigError> {
    let failed = |message: String| ConfigError::LoggingInit {
        message: format!("pipeline log '{path}': {message}"),
    };

    let file_name = path
        .file_name()
        .ok_or_else(|| failed(String::from("path has no file name")))?;
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));

    let dir = Dir::open_ambient_dir(parent, ambient_authority())
        .map_err(|error| failed(error.to_string()))?;
    let file = dir
        .open_with(file_name, OpenOptions::new().append(true).create(true))
        .map_err(|error| failed(error.to_string()))?;
    Ok(file.into_std())
}
