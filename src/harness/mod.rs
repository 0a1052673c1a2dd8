//! Assertion helpers for acceptance runs against a live platform.
//!
//! An acceptance run creates a group from environment-supplied parameters,
//! waits for it to settle, and then checks fields of the inspected group
//! document. The helpers here are pure: they compare values in a
//! [`serde_json::Value`] and expand `$NAME` references from the environment.

use serde_json::Value;

use crate::error::ConfigError;

/// Environment variables an acceptance run requires.
pub const REQUIRED_VARS: [&str; 5] = ["GROUP_NAME", "IMGNAME", "HOSTNAME", "DOMAIN", "PORT"];

/// Parameters of an acceptance run, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessEnv {
    /// Name of the group to create (`GROUP_NAME`).
    pub group_name: String,
    /// Image to run (`IMGNAME`); it must expose exactly [`Self::port`].
    pub image: String,
    /// Route host (`HOSTNAME`).
    pub hostname: String,
    /// Route domain (`DOMAIN`).
    pub domain: String,
    /// Port exposed by the image (`PORT`).
    pub port: String,
}

impl HarnessEnv {
    /// Read every required variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequired`] naming every variable that is
    /// unset or empty.
    pub fn from_env<E: mockable::Env>(env: &E) -> Result<Self, ConfigError> {
        let read = |name: &str| env.string(name).filter(|value| !value.is_empty());
        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|name| read(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: missing.join(", "),
            });
        }

        Ok(Self {
            group_name: read("GROUP_NAME").unwrap_or_default(),
            image: read("IMGNAME").unwrap_or_default(),
            hostname: read("HOSTNAME").unwrap_or_default(),
            domain: read("DOMAIN").unwrap_or_default(),
            port: read("PORT").unwrap_or_default(),
        })
    }
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Expand `$NAME` and `${NAME}` references from `env`.
///
/// References to unset variables, and a `$` not followed by a name, are left
/// as written.
#[must_use]
pub fn expand_vars<E: mockable::Env>(value: &str, env: &E) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(offset) = rest.find('$') {
        let (before, from_dollar) = rest.split_at(offset);
        out.push_str(before);
        let after = from_dollar.get(1..).unwrap_or("");

        let (name, reference_len) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (braced.get(..end).unwrap_or(""), end + 3),
                None => ("", 0),
            }
        } else if after.starts_with(is_name_start) {
            let end = after.find(|c: char| !is_name_char(c)).unwrap_or(after.len());
            (after.get(..end).unwrap_or(""), end + 1)
        } else {
            ("", 0)
        };

        let expansion = (!name.is_empty())
            .then(|| env.string(name))
            .flatten();
        match expansion {
            Some(expanded) => {
                out.push_str(&expanded);
                rest = from_dollar.get(reference_len..).unwrap_or("");
            }
            None => {
                let keep = reference_len.max(1);
                out.push_str(from_dollar.get(..keep).unwrap_or(from_dollar));
                rest = from_dollar.get(keep..).unwrap_or("");
            }
        }
    }
    out.push_str(rest);
    out
}

/// Render a JSON value the way assertions compare it: strings by content,
/// everything else as JSON text.
#[must_use]
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn matches_ignoring_case(value: Option<&Value>, expected: &str) -> bool {
    value.is_some_and(|found| stringify(found).to_uppercase() == expected.to_uppercase())
}

/// Whether top-level `param` equals `expected`, ignoring case.
#[must_use]
pub fn value_is(document: &Value, param: &str, expected: &str) -> bool {
    matches_ignoring_case(document.get(param), expected)
}

/// Whether `param` inside the object `parent` equals `expected`, ignoring
/// case.
#[must_use]
pub fn child_is(document: &Value, parent: &str, param: &str, expected: &str) -> bool {
    matches_ignoring_case(
        document.get(parent).and_then(|object| object.get(param)),
        expected,
    )
}

/// Whether `param` is missing, null, or an empty array, string, or object.
#[must_use]
pub fn list_is_empty(document: &Value, param: &str) -> bool {
    match document.get(param) {
        None | Some(Value::Null) => true,
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::String(text)) => text.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(Value::Bool(_) | Value::Number(_)) => false,
    }
}

/// Whether the array `param` contains the string `value`.
#[must_use]
pub fn list_contains(document: &Value, param: &str, value: &str) -> bool {
    document
        .get(param)
        .and_then(Value::as_array)
        .is_some_and(|items| items.iter().any(|item| item.as_str() == Some(value)))
}
