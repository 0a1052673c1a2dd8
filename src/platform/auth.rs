//! Bearer token and space GUID from the local `cf` credential store.
//!
//! The `cf` CLI keeps the session of the logged-in user in
//! `~/.cf/config.json`. Only two fields are read:
//!
//! ```json
//! {
//!   "AccessToken": "bearer eyJhbGciOi...",
//!   "SpaceFields": { "Guid": "6d1c...", "Name": "dev" }
//! }
//! ```
//!
//! The file is read through a `cap_std` directory capability, as with every
//! other file this crate opens.

use std::path::PathBuf;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::Deserialize;

use crate::error::PlatformError;

const BEARER_PREFIX: &str = "bearer ";

/// Location of the credential file relative to the home directory.
pub const CF_CONFIG_RELATIVE_PATH: &str = ".cf/config.json";

/// Credentials needed to call the containers API.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthInfo {
    /// Bearer token with any `bearer ` prefix removed.
    pub bearer_token: String,
    /// GUID of the targeted space.
    pub space_guid: String,
}

impl std::fmt::Debug for AuthInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthInfo")
            .field("bearer_token", &"<redacted>")
            .field("space_guid", &self.space_guid)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct CfConfigFile {
    #[serde(rename = "AccessToken")]
    access_token: String,
    #[serde(rename = "SpaceFields")]
    space_fields: SpaceFields,
}

#[derive(Debug, Deserialize)]
struct SpaceFields {
    #[serde(rename = "Guid")]
    guid: String,
}

/// Resolve the credential file path.
///
/// An explicit path wins; otherwise the file is looked up below `$HOME`.
///
/// # Errors
///
/// Returns [`PlatformError::AuthUnavailable`] when no explicit path is given
/// and `HOME` is unset or empty.
pub fn credentials_path<E: mockable::Env>(
    explicit: Option<&Utf8Path>,
    env: &E,
) -> Result<Utf8PathBuf, PlatformError> {
    if let Some(path) = explicit {
        return Ok(path.to_owned());
    }
    env.string("HOME")
        .filter(|home| !home.is_empty())
        .map(|home| Utf8PathBuf::from(home).join(CF_CONFIG_RELATIVE_PATH))
        .ok_or_else(|| PlatformError::AuthUnavailable {
            path: PathBuf::from(CF_CONFIG_RELATIVE_PATH),
            message: String::from("HOME is not set"),
        })
}

/// Load the bearer token and space GUID from `path`.
///
/// # Errors
///
/// Returns [`PlatformError::AuthUnavailable`] if the file cannot be read, is
/// not valid JSON, lacks `AccessToken` or `SpaceFields.Guid`, or carries an
/// empty token.
pub fn load_auth_info(path: &Utf8Path) -> Result<AuthInfo, PlatformError> {
    let (dir, file_name) = open_parent(path)?;
    load_auth_info_from_dir(&dir, file_name, path)
}

/// Load credentials from an already-opened directory capability.
///
/// Separated from [`load_auth_info`] so tests can supply a `Dir` backed by a
/// temporary directory.
///
/// # Errors
///
/// See [`load_auth_info`].
pub fn load_auth_info_from_dir(
    dir: &Dir,
    file_name: &str,
    display_path: &Utf8Path,
) -> Result<AuthInfo, PlatformError> {
    let contents = dir
        .read_to_string(file_name)
        .map_err(|error| unavailable(display_path, format!("failed to read file: {error}")))?;
    parse_auth_info(&contents, display_path)
}

fn parse_auth_info(contents: &str, display_path: &Utf8Path) -> Result<AuthInfo, PlatformError> {
    let config: CfConfigFile = serde_json::from_str(contents)
        .map_err(|error| unavailable(display_path, format!("malformed credential file: {error}")))?;

    let bearer_token = strip_bearer_prefix(&config.access_token).trim().to_owned();
    if bearer_token.is_empty() {
        return Err(unavailable(
            display_path,
            String::from("AccessToken is empty; log in with `cf login`"),
        ));
    }

    Ok(AuthInfo {
        bearer_token,
        space_guid: config.space_fields.guid,
    })
}

/// Remove a leading `bearer ` prefix, matched case-insensitively.
#[must_use]
pub fn strip_bearer_prefix(token: &str) -> &str {
    token
        .get(..BEARER_PREFIX.len())
        .filter(|prefix| prefix.eq_ignore_ascii_case(BEARER_PREFIX))
        .and_then(|_| token.get(BEARER_PREFIX.len()..))
        .unwrap_or(token)
}

fn open_parent(path: &Utf8Path) -> Result<(Dir, &str), PlatformError> {
    let parent = path
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| unavailable(path, String::from("path does not contain a filename")))?;

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|error| {
        unavailable(path, format!("failed to open parent directory: {error}"))
    })?;

    Ok((dir, file_name))
}

fn unavailable(path: &Utf8Path, message: String) -> PlatformError {
    PlatformError::AuthUnavailable {
        path: PathBuf::from(path.as_std_path()),
        message,
    }
}
