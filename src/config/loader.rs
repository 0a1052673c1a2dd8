//! Configuration loading with layered precedence.
//!
//! This module provides functions to load configuration with the precedence order
//! (lowest to highest): application defaults, configuration file, environment
//! variables, command-line arguments.
//!
//! # Layer Composition
//!
//! Layers are pushed onto a `MergeComposer` by hand. `Cli` owns subcommand
//! dispatch, so `AppConfig` never parses arguments itself, and the unprefixed
//! pipeline names (`WAIT_TIME`, `SETUP_SERVICE_SPACE`, ...) are mapped through
//! an explicit table rather than a prefix.
//!
//! # Environment Variable Handling
//!
//! Typed variables (`WAIT_TIME=soon`, `ICGROUP_API_PORT=70000`) fail loading
//! with [`ConfigError::InvalidValue`]. Pipeline flags follow the conventions of
//! the pipeline that sets them:
//!
//! - `DEBUG` and `LOGMET_LOGGING_ENABLED` are on when set to any non-empty value.
//! - `SETUP_SERVICE_SPACE` is on only for `true`, in any letter case.

use camino::Utf8PathBuf;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use ortho_config::discovery::ConfigDiscovery;
use ortho_config::serde_json::{self, Map, Value};
use ortho_config::{MergeComposer, toml};

use crate::config::{AppConfig, Cli};
use crate::error::{ConfigError, Result};

// ============================================================================
// Environment Variable Specification Table
// ============================================================================

/// The type of value expected from an environment variable.
#[derive(Clone, Copy)]
enum EnvVarType {
    /// String value (always accepted).
    String,
    /// Boolean value (`true`/`false`). Invalid values return an error.
    Bool,
    /// On when set to any non-empty value.
    Flag,
    /// On only for `true`, compared case-insensitively; anything else is off.
    TrueLiteral,
    /// Unsigned 64-bit integer. Invalid values return an error.
    U64,
    /// TCP port (0 to 65535). Invalid values return an error.
    Port,
}

/// Specification for a single environment variable mapping.
struct EnvVarSpec {
    /// The environment variable name (e.g., `WAIT_TIME`).
    env_var: &'static str,
    /// The JSON path segments (e.g., `["timing", "wait_time_minutes"]`).
    path: &'static [&'static str],
    /// The expected value type.
    var_type: EnvVarType,
}

/// Table of all environment variables and their JSON paths.
///
/// Rows are applied in order, so a later row for the same path wins when both
/// variables are set.
const ENV_VAR_SPECS: &[EnvVarSpec] = &[
    EnvVarSpec {
        env_var: "ICGROUP_CF_BINARY",
        path: &["cf_binary"],
        var_type: EnvVarType::String,
    },
    // Logging
    EnvVarSpec {
        env_var: "DEBUG",
        path: &["logging", "debug"],
        var_type: EnvVarType::Flag,
    },
    EnvVarSpec {
        env_var: "ICGROUP_DEBUG",
        path: &["logging", "debug"],
        var_type: EnvVarType::Bool,
    },
    EnvVarSpec {
        env_var: "LOGMET_LOGGING_ENABLED",
        path: &["logging", "pipeline_enabled"],
        var_type: EnvVarType::Flag,
    },
    EnvVarSpec {
        env_var: "PIPELINE_LOGGING_FILE",
        path: &["logging", "pipeline_file"],
        var_type: EnvVarType::String,
    },
    // Timing
    EnvVarSpec {
        env_var: "WAIT_TIME",
        path: &["timing", "wait_time_minutes"],
        var_type: EnvVarType::U64,
    },
    EnvVarSpec {
        env_var: "INT_EST_TIME",
        path: &["timing", "init_time_secs"],
        var_type: EnvVarType::U64,
    },
    EnvVarSpec {
        env_var: "ICGROUP_INITIAL_POLL_SECS",
        path: &["timing", "initial_poll_secs"],
        var_type: EnvVarType::U64,
    },
    EnvVarSpec {
        env_var: "ICGROUP_POLL_INTERVAL_SECS",
        path: &["timing", "poll_interval_secs"],
        var_type: EnvVarType::U64,
    },
    // Platform
    EnvVarSpec {
        env_var: "ICGROUP_CREDENTIALS_PATH",
        path: &["platform", "credentials_path"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "SETUP_SERVICE_SPACE",
        path: &["platform", "setup_service_space"],
        var_type: EnvVarType::TrueLiteral,
    },
    EnvVarSpec {
        env_var: "OLDCF_LOCATION",
        path: &["platform", "legacy_cli_path"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "ICGROUP_API_PORT",
        path: &["platform", "api_port"],
        var_type: EnvVarType::Port,
    },
];

/// Returns the list of environment variable names recognised by the config loader.
///
/// This is primarily useful for tests that need to clear every recognised
/// variable to ensure isolation. Using this function instead of a hard-coded
/// list keeps tests in sync with the loader's actual mappings.
#[must_use]
pub fn env_var_names() -> Vec<&'static str> {
    ENV_VAR_SPECS.iter().map(|spec| spec.env_var).collect()
}

/// Load a configuration file and push it to the composer.
///
/// Uses `cap_std::fs_utf8` for capability-oriented filesystem access as per
/// project conventions. The function opens the parent directory of the config
/// file and reads from there.
fn load_config_file(path: &Utf8PathBuf, composer: &mut MergeComposer) -> Result<()> {
    let current_dir = Utf8PathBuf::from(".");
    let parent = path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| current_dir.as_ref());
    let file_name = path.file_name().unwrap_or(path.as_str());

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|e| {
        ConfigError::ParseError {
            message: format!("failed to open directory {parent}: {e}"),
        }
    })?;

    let content = dir
        .read_to_string(file_name)
        .map_err(|e| ConfigError::ParseError {
            message: format!("failed to read {path}: {e}"),
        })?;

    let value =
        toml::from_str::<serde_json::Value>(&content).map_err(|e| ConfigError::ParseError {
            message: format!("failed to parse {path}: {e}"),
        })?;

    composer.push_file(value, Some(path.clone()));
    Ok(())
}

/// Load configuration with full layer precedence from the process environment.
///
/// See [`load_config_with_env`].
///
/// # Errors
///
/// See [`load_config_with_env`].
pub fn load_config(cli: &Cli) -> Result<AppConfig> {
    load_config_with_env(cli, &mockable::DefaultEnv::new())
}

/// Load configuration with full layer precedence.
///
/// This function loads configuration from all available sources:
/// 1. Application defaults defined in the struct
/// 2. Configuration file (discovered via XDG paths or `ICGROUP_CONFIG_PATH`)
/// 3. Environment variables listed in [`env_var_names`], read from `env`
/// 4. Command-line arguments (from the provided `Cli`)
///
/// Later sources override earlier ones.
///
/// # Errors
///
/// Returns `ConfigError` if configuration loading fails due to:
/// - An explicit `--config` path that does not exist
/// - Malformed configuration files
/// - Invalid typed environment variable values (e.g., a non-numeric
///   `WAIT_TIME`)
/// - Values the merged configuration cannot hold
pub fn load_config_with_env<E: mockable::Env>(cli: &Cli, env: &E) -> Result<AppConfig> {
    let mut composer = MergeComposer::new();

    // Layer 1: Defaults (serialised from AppConfig::default()).
    let defaults =
        serde_json::to_value(AppConfig::default()).map_err(|e| ConfigError::ParseError {
            message: format!("failed to serialise defaults: {e}"),
        })?;
    composer.push_defaults(defaults);

    // Layer 2: Configuration file. An explicit path must exist.
    if let Some(explicit) = cli.config.as_ref().filter(|p| !p.exists()) {
        return Err(ConfigError::FileNotFound {
            path: explicit.clone().into_std_path_buf(),
        }
        .into());
    }
    let config_path: Option<Utf8PathBuf> =
        cli.config.clone().or_else(|| {
            let discovery = ConfigDiscovery::builder("icgroup")
                .env_var("ICGROUP_CONFIG_PATH")
                .config_file_name("config.toml")
                .dotfile_name(".icgroup.toml")
                .build();
            discovery
                .candidates()
                .into_iter()
                .filter(|p| p.exists())
                .find_map(|p| Utf8PathBuf::try_from(p).ok())
        });

    if let Some(ref path) = config_path {
        load_config_file(path, &mut composer)?;
    }

    // Layer 3: Environment variables.
    let env_values = collect_env_vars(env)?;
    if !env_values.is_null() {
        composer.push_environment(env_values);
    }

    // Layer 4: CLI overrides.
    let cli_overrides = build_cli_overrides(cli);
    if !cli_overrides.is_null() {
        composer.push_cli(cli_overrides);
    }

    let config =
        AppConfig::merge_from_layers(composer.layers()).map_err(ConfigError::OrthoConfig)?;

    Ok(config)
}

fn invalid(spec: &EnvVarSpec, reason: String) -> ConfigError {
    ConfigError::InvalidValue {
        field: spec.env_var.to_owned(),
        reason,
    }
}

/// Parse one raw variable according to its spec.
fn parse_env_value(spec: &EnvVarSpec, raw_value: String) -> Result<Value> {
    let json_value = match spec.var_type {
        EnvVarType::String => Value::String(raw_value),
        EnvVarType::Bool => match raw_value.parse::<bool>() {
            Ok(b) => Value::Bool(b),
            Err(_) => {
                return Err(invalid(
                    spec,
                    format!("expected bool (true/false), got '{raw_value}'"),
                )
                .into());
            }
        },
        EnvVarType::Flag => Value::Bool(!raw_value.is_empty()),
        EnvVarType::TrueLiteral => Value::Bool(raw_value.eq_ignore_ascii_case("true")),
        EnvVarType::U64 => match raw_value.parse::<u64>() {
            Ok(n) => Value::Number(n.into()),
            Err(_) => {
                return Err(invalid(
                    spec,
                    format!("expected unsigned integer, got '{raw_value}'"),
                )
                .into());
            }
        },
        EnvVarType::Port => match raw_value.parse::<u16>() {
            Ok(n) => Value::Number(n.into()),
            Err(_) => {
                return Err(invalid(
                    spec,
                    format!("expected a port number (0-65535), got '{raw_value}'"),
                )
                .into());
            }
        },
    };
    Ok(json_value)
}

/// Collect recognised environment variables into a JSON value.
///
/// All mappings are defined in [`ENV_VAR_SPECS`].
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if a typed environment variable has an
/// unparseable value.
fn collect_env_vars<E: mockable::Env>(env: &E) -> Result<Value> {
    let mut root = Map::new();

    for spec in ENV_VAR_SPECS {
        let Some(raw_value) = env.string(spec.env_var) else {
            continue;
        };
        let json_value = parse_env_value(spec, raw_value)?;
        insert_at_path(&mut root, spec.path, json_value);
    }

    if root.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(Value::Object(root))
    }
}

/// Insert a value at a nested path in a JSON map.
///
/// For a path like `["timing", "wait_time_minutes"]`, this creates the
/// intermediate `timing` object if needed and inserts the field within it.
fn insert_at_path(root: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((&field, parents)) = path.split_last() else {
        return;
    };

    let mut current = root;
    for &segment in parents {
        let entry = current
            .entry(segment.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(obj) = entry.as_object_mut() else {
            return;
        };
        current = obj;
    }

    current.insert(field.to_owned(), value);
}

/// Build a JSON value containing CLI overrides.
fn build_cli_overrides(cli: &Cli) -> serde_json::Value {
    let mut overrides = serde_json::Map::new();

    if let Some(ref binary) = cli.cf_binary {
        overrides.insert(
            "cf_binary".to_owned(),
            serde_json::Value::String(binary.clone()),
        );
    }

    if overrides.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::Value::Object(overrides)
    }
}
