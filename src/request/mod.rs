//! Group-creation request assembly.
//!
//! This module turns the flat option record gathered by the CLI into the
//! nested document accepted by `POST /v3/containers/groups`. The builder is
//! pure: it performs no I/O and the same [`GroupOptions`] always yields the
//! same [`CreationRequest`].
//!
//! Every supplied option is classified independently:
//!
//! - `Min`, `Max` and `Desired` feed the `NumberInstances` triple, which is
//!   completed by the defaulting rules in [`InstanceCounts::resolve`].
//! - `PublishAllPorts` is emitted as `"true"` only when set, never as
//!   `"false"`.
//! - `host` and `domain` are copied into `Route`. Independently of that, a
//!   boolean value is written under its own name as `"true"`/`"false"` and
//!   any other value is written under its own name unchanged.
//! - `WorkingDir` is always the empty string.

mod instances;
mod memory;

use std::collections::BTreeMap;

use serde::Serialize;

pub use instances::InstanceCounts;
pub use memory::{MemorySize, SUPPORTED_MEMORY_SIZES};

use crate::error::RequestError;

const KEY_NAME: &str = "Name";
const KEY_MEMORY: &str = "Memory";
const KEY_IMAGE: &str = "Image";
const KEY_CMD: &str = "Cmd";
const KEY_ENV: &str = "Env";
const KEY_PORT: &str = "Port";
const KEY_PUBLISH_ALL_PORTS: &str = "PublishAllPorts";
const KEY_VOLUMES: &str = "Volumes";
const KEY_MIN: &str = "Min";
const KEY_MAX: &str = "Max";
const KEY_DESIRED: &str = "Desired";
const KEY_AUTORECOVERY: &str = "Autorecovery";
const KEY_ANTI_AFFINITY: &str = "AntiAffinity";
const KEY_SESSION_AFFINITY: &str = "SessionAffinity";
const KEY_HTTP_MONITOR: &str = "HTTP_MONITOR";
const KEY_HTTP_MONITOR_PATH: &str = "HTTP_MONITOR_PATH";
const KEY_HTTP_MONITOR_RC_LIST: &str = "HTTP_MONITOR_RC_LIST";
const KEY_FLOATING_IP: &str = "FloatingIpAddress";
const KEY_HOST: &str = "host";
const KEY_DOMAIN: &str = "domain";
const KEY_ROUTE: &str = "Route";
const KEY_NUMBER_INSTANCES: &str = "NumberInstances";
const KEY_WORKING_DIR: &str = "WorkingDir";

const INSTANCE_KEYS: [&str; 3] = [KEY_MIN, KEY_MAX, KEY_DESIRED];
const ROUTE_KEYS: [&str; 2] = [KEY_DOMAIN, KEY_HOST];

/// Parse a boolean option from its accepted literal spellings.
///
/// `True`, `TRUE`, `true` and `1` are true; `False`, `FALSE`, `false` and
/// `0` are false.
///
/// # Errors
///
/// Returns [`RequestError::InvalidArgument`] for any other spelling.
pub fn parse_bool_literal(field: &str, raw: &str) -> Result<bool, RequestError> {
    match raw {
        "True" | "TRUE" | "true" | "1" => Ok(true),
        "False" | "FALSE" | "false" | "0" => Ok(false),
        other => Err(RequestError::InvalidArgument {
            field: field.to_owned(),
            reason: format!("'{other}' is not a boolean (expected true/false/1/0)"),
        }),
    }
}

const fn bool_literal(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// The flat option record describing a group to create.
///
/// `port` and `publish_all_ports` are mutually exclusive; the CLI parser
/// enforces this before a record is built and the builder trusts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupOptions {
    /// Group name.
    pub name: String,
    /// Memory per instance in MB; must be one of [`SUPPORTED_MEMORY_SIZES`].
    pub memory: u32,
    /// Route host name.
    pub host: Option<String>,
    /// Route domain.
    pub domain: Option<String>,
    /// Environment entries in `KEY=VALUE` form.
    pub env: Vec<String>,
    /// Port to expose.
    pub port: Option<u16>,
    /// Publish every port exposed by the image.
    pub publish_all_ports: Option<bool>,
    /// Volume bindings in `volume:/path` form.
    pub volumes: Vec<String>,
    /// Minimum instance count.
    pub min: Option<u32>,
    /// Maximum instance count.
    pub max: Option<u32>,
    /// Desired instance count.
    pub desired: Option<u32>,
    /// Restart failed instances automatically.
    pub autorecovery: bool,
    /// Spread instances across hosts.
    pub anti_affinity: bool,
    /// Pin client sessions to one instance.
    pub session_affinity: bool,
    /// Enable the HTTP health monitor.
    pub http_monitor: bool,
    /// Path probed by the HTTP health monitor.
    pub http_monitor_path: String,
    /// Comma-separated status codes the monitor treats as healthy.
    pub http_monitor_rc_list: String,
    /// Floating IP address to bind.
    pub floating_ip: Option<String>,
    /// Image to run.
    pub image: String,
    /// Command and arguments overriding the image entry point.
    pub cmd: Vec<String>,
}

impl GroupOptions {
    /// Create an option record with the documented defaults.
    #[must_use]
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            memory: MemorySize::default().megabytes(),
            host: None,
            domain: None,
            env: Vec::new(),
            port: None,
            publish_all_ports: None,
            volumes: Vec::new(),
            min: None,
            max: None,
            desired: None,
            autorecovery: false,
            anti_affinity: false,
            session_affinity: false,
            http_monitor: true,
            http_monitor_path: String::new(),
            http_monitor_rc_list: String::new(),
            floating_ip: None,
            image: image.into(),
            cmd: Vec::new(),
        }
    }

    fn entries(&self, memory: MemorySize) -> Vec<(&'static str, Option<OptionValue>)> {
        vec![
            (KEY_NAME, Some(OptionValue::Text(self.name.clone()))),
            (KEY_MEMORY, Some(OptionValue::Int(u64::from(memory.megabytes())))),
            (KEY_HOST, self.host.clone().map(OptionValue::Text)),
            (KEY_DOMAIN, self.domain.clone().map(OptionValue::Text)),
            (KEY_ENV, OptionValue::list(&self.env)),
            (KEY_PORT, self.port.map(|port| OptionValue::Int(u64::from(port)))),
            (KEY_PUBLISH_ALL_PORTS, self.publish_all_ports.map(OptionValue::Bool)),
            (KEY_VOLUMES, OptionValue::list(&self.volumes)),
            (KEY_MIN, self.min.map(|count| OptionValue::Int(u64::from(count)))),
            (KEY_MAX, self.max.map(|count| OptionValue::Int(u64::from(count)))),
            (KEY_DESIRED, self.desired.map(|count| OptionValue::Int(u64::from(count)))),
            (KEY_AUTORECOVERY, Some(OptionValue::Bool(self.autorecovery))),
            (KEY_ANTI_AFFINITY, Some(OptionValue::Bool(self.anti_affinity))),
            (KEY_SESSION_AFFINITY, Some(OptionValue::Bool(self.session_affinity))),
            (KEY_HTTP_MONITOR, Some(OptionValue::Bool(self.http_monitor))),
            (
                KEY_HTTP_MONITOR_PATH,
                Some(OptionValue::Text(self.http_monitor_path.clone())),
            ),
            (
                KEY_HTTP_MONITOR_RC_LIST,
                Some(OptionValue::Text(self.http_monitor_rc_list.clone())),
            ),
            (KEY_FLOATING_IP, self.floating_ip.clone().map(OptionValue::Text)),
            (KEY_IMAGE, Some(OptionValue::Text(self.image.clone()))),
            (KEY_CMD, OptionValue::list(&self.cmd)),
        ]
    }
}

/// A parsed option value prior to classification.
#[derive(Debug, Clone, PartialEq, Eq)]
enum OptionValue {
    Bool(bool),
    Int(u64),
    Text(String),
    List(Vec<String>),
}

impl OptionValue {
    fn list(items: &[String]) -> Option<Self> {
        (!items.is_empty()).then(|| Self::List(items.to_vec()))
    }

    fn into_text(self) -> String {
        match self {
            Self::Bool(flag) => bool_literal(flag).to_owned(),
            Self::Int(number) => number.to_string(),
            Self::Text(text) => text,
            Self::List(items) => items.join(","),
        }
    }
}

/// A value in the creation document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A string, including stringified booleans and counts.
    Text(String),
    /// A raw integer (`Memory`, `Port`).
    Number(u64),
    /// An ordered sequence (`Cmd`, `Env`, `Volumes`).
    List(Vec<String>),
    /// A nested string map (`Route`, `NumberInstances`).
    Map(BTreeMap<String, String>),
}

impl FieldValue {
    /// Return the string payload, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Return the nested map, if this is a map value.
    #[must_use]
    pub const fn as_map(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Return the sequence, if this is a list value.
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<OptionValue> for FieldValue {
    fn from(value: OptionValue) -> Self {
        match value {
            OptionValue::Bool(flag) => Self::Text(bool_literal(flag).to_owned()),
            OptionValue::Int(number) => Self::Number(number),
            OptionValue::Text(text) => Self::Text(text),
            OptionValue::List(items) => Self::List(items),
        }
    }
}

/// The group-creation document sent to the containers API.
///
/// Keys are held in a `BTreeMap`, so serialisation is always key-sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CreationRequest {
    fields: BTreeMap<String, FieldValue>,
}

impl CreationRequest {
    /// Look up a top-level field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Return the resolved `NumberInstances` map.
    #[must_use]
    pub fn number_instances(&self) -> Option<&BTreeMap<String, String>> {
        self.get(KEY_NUMBER_INSTANCES).and_then(FieldValue::as_map)
    }

    /// Return the `Route` map, present only when a host or domain was given.
    #[must_use]
    pub fn route(&self) -> Option<&BTreeMap<String, String>> {
        self.get(KEY_ROUTE).and_then(FieldValue::as_map)
    }

    /// Iterate over the top-level keys in wire order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Serialise to the compact, key-sorted JSON wire body.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Serialisation`] if `serde_json` rejects the
    /// document.
    pub fn to_wire_body(&self) -> Result<String, RequestError> {
        serde_json::to_string(self).map_err(|error| RequestError::Serialisation {
            message: error.to_string(),
        })
    }
}

/// Build the creation document for `options`.
///
/// # Errors
///
/// Returns [`RequestError::InvalidArgument`] when the memory size is not
/// supported or the instance counts cannot be reconciled.
pub fn build_creation_request(options: &GroupOptions) -> Result<CreationRequest, RequestError> {
    let memory = MemorySize::try_from(options.memory)?;
    let mut document = DocumentBuilder::default();
    for (name, value) in options.entries(memory) {
        document.classify(name, value);
    }
    document.finish()
}

#[derive(Debug, Default)]
struct DocumentBuilder {
    fields: BTreeMap<String, FieldValue>,
    route: BTreeMap<String, String>,
    instances: BTreeMap<&'static str, u32>,
}

impl DocumentBuilder {
    fn classify(&mut self, name: &'static str, value: Option<OptionValue>) {
        if INSTANCE_KEYS.contains(&name) {
            if let Some(OptionValue::Int(count)) = value {
                self.instances
                    .insert(name, u32::try_from(count).unwrap_or(u32::MAX));
            }
            return;
        }

        if name == KEY_PUBLISH_ALL_PORTS {
            if value == Some(OptionValue::Bool(true)) {
                self.insert(name, FieldValue::Text(bool_literal(true).to_owned()));
            }
            return;
        }

        let Some(present) = value else {
            return;
        };

        if ROUTE_KEYS.contains(&name) {
            self.route.insert(name.to_owned(), present.clone().into_text());
        }
        // Independent of the route check above: both may apply to one field.
        self.insert(name, FieldValue::from(present));
    }

    fn insert(&mut self, name: &str, value: FieldValue) {
        self.fields.insert(name.to_owned(), value);
    }

    fn finish(mut self) -> Result<CreationRequest, RequestError> {
        let counts = InstanceCounts::resolve(
            self.instances.get(KEY_MIN).copied(),
            self.instances.get(KEY_MAX).copied(),
            self.instances.get(KEY_DESIRED).copied(),
        )?;
        self.fields.insert(
            KEY_NUMBER_INSTANCES.to_owned(),
            FieldValue::Map(counts.to_wire_map()),
        );

        if !self.route.is_empty() {
            let route = std::mem::take(&mut self.route);
            self.fields
                .insert(KEY_ROUTE.to_owned(), FieldValue::Map(route));
        }

        self.fields.insert(
            KEY_WORKING_DIR.to_owned(),
            FieldValue::Text(String::new()),
        );

        Ok(CreationRequest {
            fields: self.fields,
        })
    }
}
