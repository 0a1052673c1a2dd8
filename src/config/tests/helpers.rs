//! Shared fixtures and helper functions for config tests.

use crate::config::AppConfig;
use ortho_config::MergeComposer;
use rstest::fixture;
use std::sync::Arc;

/// Fixture providing an `AppConfig` parsed from a full TOML example.
#[fixture]
pub fn app_config_from_full_toml() -> AppConfig {
    let toml = r#"
        cf_binary = "/usr/local/bin/cf"

        [logging]
        debug = true
        pipeline_enabled = true
        pipeline_file = "/var/log/pipeline/icgroup.log"

        [timing]
        wait_time_minutes = 15
        init_time_secs = 40
        initial_poll_secs = 1
        poll_interval_secs = 2

        [platform]
        credentials_path = "/etc/cf/config.json"
        setup_service_space = true
        legacy_cli_path = "/opt/oldcf/cf"
        api_port = 9443
    "#;

    toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Fixture providing an `AppConfig` parsed from a minimal TOML example.
#[fixture]
pub fn app_config_from_partial_toml() -> AppConfig {
    let toml = r"
        [timing]
        wait_time_minutes = 8
    ";

    toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Helper: Creates a `MergeComposer` with defaults layer already pushed.
pub fn create_composer_with_defaults() -> Result<MergeComposer, serde_json::Error> {
    let mut composer = MergeComposer::new();
    let defaults = ortho_config::serde_json::to_value(AppConfig::default())?;
    composer.push_defaults(defaults);
    Ok(composer)
}

/// Helper: Merges layers from a composer into `AppConfig`.
pub fn merge_config(composer: MergeComposer) -> Result<AppConfig, Arc<ortho_config::OrthoError>> {
    AppConfig::merge_from_layers(composer.layers())
}

/// Helper: Asserts that a config has all default values.
pub fn assert_config_has_defaults(config: &AppConfig) {
    assert!(config.cf_binary.is_none(), "cf_binary should be None");
    assert_eq!(config.cf_binary(), "cf");
    assert!(!config.logging.debug, "logging.debug should be false");
    assert!(
        config.logging.active_pipeline_file().is_none(),
        "pipeline logging should be off"
    );
    assert_eq!(config.timing.wait_time_minutes, 5);
    assert_eq!(config.timing.init_time_secs, 0);
    assert_eq!(config.timing.initial_poll_secs, 10);
    assert_eq!(config.timing.poll_interval_secs, 20);
    assert!(config.platform.credentials_path.is_none());
    assert!(!config.platform.setup_service_space);
    assert!(config.platform.legacy_cli_path.is_none());
    assert_eq!(config.platform.api_port, 8443);
}

/// Helper: Creates a `MergeComposer` with defaults, file, and env layers for
/// testing layer precedence.
pub fn create_composer_with_file_and_env() -> Result<MergeComposer, serde_json::Error> {
    use ortho_config::serde_json::json;

    let mut composer = create_composer_with_defaults()?;

    composer.push_file(
        json!({
            "cf_binary": "/from/file/cf",
            "timing": { "wait_time_minutes": 7, "init_time_secs": 3 }
        }),
        None,
    );

    composer.push_environment(json!({
        "cf_binary": "/from/env/cf",
        "timing": { "wait_time_minutes": 9 }
    }));

    Ok(composer)
}
