//! Semantic error types for the icgroup application.
//!
//! This module defines the error hierarchy for icgroup, following the principle of
//! using semantic error enums (via `thiserror`) for conditions the caller might
//! inspect or map to an exit status, while reserving opaque errors
//! (`eyre::Report`) for the application boundary.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found at the expected path.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// The path where the configuration file was expected.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("failed to parse configuration file: {message}")]
    ParseError {
        /// A description of the parse error.
        message: String,
    },

    /// A required configuration value is missing.
    #[error("missing required configuration: {field}")]
    MissingRequired {
        /// The name of the missing field.
        field: String,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// The name of the invalid field.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// The `OrthoConfig` library returned an error during configuration loading.
    #[error("configuration loading failed: {0}")]
    OrthoConfig(Arc<ortho_config::OrthoError>),

    /// The logging subscriber could not be installed.
    #[error("failed to initialise logging: {message}")]
    LoggingInit {
        /// A description of the failure.
        message: String,
    },
}

/// Errors raised while turning group options into a creation request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    /// An option value is outside its accepted domain.
    #[error("invalid argument '{field}': {reason}")]
    InvalidArgument {
        /// The option name as it appears in the request document.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The finished document could not be encoded as JSON.
    #[error("failed to serialise creation request: {message}")]
    Serialisation {
        /// A description of the encoder failure.
        message: String,
    },
}

/// Errors raised by the platform adapters (credential store, `cf` CLI).
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The local credential store is missing or malformed.
    #[error("authentication unavailable from '{path}': {message}")]
    AuthUnavailable {
        /// The credential file that was consulted.
        path: PathBuf,
        /// A description of the failure.
        message: String,
    },

    /// The API endpoints could not be discovered.
    #[error("API endpoint unavailable: {message}")]
    EndpointUnavailable {
        /// A description of the failure.
        message: String,
    },

    /// An external command exited with a non-zero status.
    #[error("command '{command}' failed with exit code {code}: {stderr}")]
    ExternalCommandFailed {
        /// The command line that was run.
        command: String,
        /// The exit code, or `-1` when the process was terminated by a signal.
        code: i32,
        /// Captured standard error.
        stderr: String,
    },

    /// An external command could not be started at all.
    #[error("failed to run command '{command}': {message}")]
    CommandSpawnFailed {
        /// The command line that was attempted.
        command: String,
        /// A description of the failure.
        message: String,
    },

    /// An external command produced output that could not be interpreted.
    #[error("unexpected output from '{command}': {message}")]
    MalformedOutput {
        /// The command line that was run.
        command: String,
        /// A description of the problem.
        message: String,
    },

    /// A platform service could not be located, bound, or read.
    #[error("service '{service}' unavailable: {message}")]
    ServiceUnavailable {
        /// The service offering name.
        service: String,
        /// A description of the failure.
        message: String,
    },
}

/// Errors raised while submitting a request to the containers API.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    /// The remote API answered with a status code of 400 or above.
    #[error("request rejected with status {status}: {body}")]
    RemoteRejected {
        /// The HTTP status code.
        status: u16,
        /// The response body.
        body: String,
    },

    /// The request could not be delivered or its response not read.
    #[error("failed to reach '{url}': {message}")]
    TransportFailed {
        /// The target URL.
        url: String,
        /// A description of the failure.
        message: String,
    },

    /// The Tokio runtime backing the HTTP client could not be created.
    #[error("failed to create async runtime: {message}")]
    RuntimeCreationFailed {
        /// A description of the failure.
        message: String,
    },
}

/// Top-level error type for the icgroup application.
///
/// This enum aggregates all domain-specific errors into a single type that can
/// be used throughout the application. At the application boundary (main.rs),
/// these errors are converted to `eyre::Report` for human-readable reporting.
#[derive(Debug, Error)]
pub enum IcGroupError {
    /// An error occurred during configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The group options were rejected.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// A platform adapter failed.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// Submitting to the containers API failed.
    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// A specialised `Result` type for icgroup operations.
pub type Result<T> = std::result::Result<T, IcGroupError>;
