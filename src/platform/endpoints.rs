//! API endpoint discovery through `cf api`.
//!
//! `cf api` reports the targeted control plane in the form
//!
//! ```text
//! API endpoint: https://api.ng.bluemix.net (API version: 2.23.0)
//! ```
//!
//! The first whitespace-delimited token starting with `https://` is taken as
//! the control-plane URL. The containers API lives on the same domain with
//! `api.` replaced by `containers-api.`.

use tracing::debug;

use super::{CommandRunner, command_line, owned_args};
use crate::error::PlatformError;

const HTTPS_SCHEME: &str = "https://";
const CONTROL_PLANE_MARKER: &str = "api.";
const CONTAINERS_MARKER: &str = "containers-api.";

/// The pair of API base URLs used by this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    /// Cloud Foundry control-plane URL, e.g. `https://api.ng.bluemix.net`.
    pub control_plane: String,
    /// Containers API URL, e.g. `https://containers-api.ng.bluemix.net`.
    pub containers: String,
}

impl ApiEndpoints {
    /// Derive both endpoints from a control-plane URL.
    #[must_use]
    pub fn from_control_plane(url: impl Into<String>) -> Self {
        let control_plane = url.into();
        let containers = control_plane.replace(CONTROL_PLANE_MARKER, CONTAINERS_MARKER);
        Self {
            control_plane,
            containers,
        }
    }

    /// URL of the group collection on the containers API.
    #[must_use]
    pub fn groups_url(&self, port: u16) -> String {
        format!("{}:{port}/v3/containers/groups", self.containers)
    }
}

/// Extract the first `https://` token from `cf api` output.
#[must_use]
pub fn parse_api_output(output: &str) -> Option<&str> {
    output
        .split_whitespace()
        .find(|word| word.starts_with(HTTPS_SCHEME))
}

/// Discover the API endpoints by running `<cf_binary> api`.
///
/// # Errors
///
/// Returns [`PlatformError::EndpointUnavailable`] when the command cannot be
/// run, exits non-zero, or prints no `https://` URL.
pub fn resolve_endpoints<R: CommandRunner>(
    runner: &R,
    cf_binary: &str,
) -> Result<ApiEndpoints, PlatformError> {
    let args = owned_args(&["api"]);
    let output = runner
        .run(cf_binary, &args)
        .map_err(|error| PlatformError::EndpointUnavailable {
            message: error.to_string(),
        })?;

    if !output.success() {
        return Err(PlatformError::EndpointUnavailable {
            message: format!(
                "'{}' exited with code {}",
                command_line(cf_binary, &args),
                output.code.unwrap_or(-1)
            ),
        });
    }

    let control_plane =
        parse_api_output(&output.stdout).ok_or_else(|| PlatformError::EndpointUnavailable {
            message: format!(
                "no {HTTPS_SCHEME} endpoint in '{}' output",
                command_line(cf_binary, &args)
            ),
        })?;

    let endpoints = ApiEndpoints::from_control_plane(control_plane);
    debug!(
        control_plane = %endpoints.control_plane,
        containers = %endpoints.containers,
        "resolved API endpoints"
    );
    Ok(endpoints)
}
