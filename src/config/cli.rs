//! Command-line argument definitions for icgroup.

use camino::Utf8PathBuf;
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::api::CredentialsRequest;
use crate::platform::services::{DEFAULT_SERVICE_KEY, DEFAULT_SERVICE_PLAN};
use crate::request::{GroupOptions, parse_bool_literal};

/// Command-line interface for icgroup.
#[derive(Debug, Parser)]
#[command(name = "icgroup")]
#[command(author, version, about = "Create and manage IBM Containers groups")]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file.
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// The `cf` executable to run.
    #[arg(long, global = true)]
    pub cf_binary: Option<String>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a container group.
    Create(CreateArgs),

    /// Print the inspected document of a group.
    Inspect(GroupNameArgs),

    /// Wait until a group has left `CREATE_IN_PROGRESS` and print it.
    Wait(GroupNameArgs),

    /// Force-remove a group.
    Rm(GroupNameArgs),

    /// Print the control-plane and containers API URLs.
    Endpoints,

    /// Print the remaining wait budget in seconds.
    RemainingWait,

    /// Print the credentials of a service in the targeted space.
    ServiceCredentials(ServiceCredentialsArgs),
}

fn bool_literal(raw: &str) -> Result<bool, String> {
    parse_bool_literal("value", raw).map_err(|error| error.to_string())
}

/// Arguments for the `create` subcommand.
#[derive(Debug, Clone, Args)]
pub struct CreateArgs {
    /// Name of the group.
    #[arg(long, required = true)]
    pub name: String,

    /// Memory per instance in MB.
    #[arg(short = 'm', long, default_value_t = 256)]
    pub memory: u32,

    /// Route host name.
    #[arg(short = 'n', long = "hostname")]
    pub host: Option<String>,

    /// Route domain.
    #[arg(short = 'd', long)]
    pub domain: Option<String>,

    /// Environment entry in `KEY=value` form (repeatable).
    #[arg(short = 'e', long = "env")]
    pub env: Vec<String>,

    /// Port to expose.
    #[arg(short = 'p', long, conflicts_with = "publish_all")]
    pub port: Option<u16>,

    /// Publish every port the image exposes.
    #[arg(short = 'P', long = "publish-all", value_parser = bool_literal)]
    pub publish_all: Option<bool>,

    /// Volume in `name:/path` form (repeatable).
    #[arg(short = 'v', long = "volume")]
    pub volumes: Vec<String>,

    /// Minimum number of instances.
    #[arg(long)]
    pub min: Option<u32>,

    /// Maximum number of instances.
    #[arg(long)]
    pub max: Option<u32>,

    /// Desired number of instances.
    #[arg(long)]
    pub desired: Option<u32>,

    /// Restart failed instances automatically.
    #[arg(
        long = "auto",
        action = ArgAction::Set,
        value_parser = bool_literal,
        default_value = "false",
    )]
    pub autorecovery: bool,

    /// Spread instances across hosts.
    #[arg(
        long = "anti",
        action = ArgAction::Set,
        value_parser = bool_literal,
        default_value = "false",
    )]
    pub anti_affinity: bool,

    /// Route a client to the same instance.
    #[arg(
        long,
        action = ArgAction::Set,
        value_parser = bool_literal,
        default_value = "false",
    )]
    pub session_affinity: bool,

    /// Enable the HTTP health monitor.
    #[arg(
        long = "http-monitor-enabled",
        action = ArgAction::Set,
        value_parser = bool_literal,
        default_value = "true",
    )]
    pub http_monitor: bool,

    /// Path probed by the HTTP health monitor.
    #[arg(long, default_value = "")]
    pub http_monitor_path: String,

    /// Response codes the HTTP health monitor accepts.
    #[arg(long, default_value = "")]
    pub http_monitor_rc_list: String,

    /// Floating IP address to assign.
    #[arg(long = "ip")]
    pub floating_ip: Option<String>,

    /// Print the request body instead of submitting it.
    #[arg(long)]
    pub dry_run: bool,

    /// Image to run.
    #[arg(required = true)]
    pub image: String,

    /// Command and arguments to run in each instance.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub cmd: Vec<String>,
}

impl CreateArgs {
    /// Convert the parsed flags into the request builder's input record.
    #[must_use]
    pub fn to_group_options(&self) -> GroupOptions {
        GroupOptions {
            host: self.host.clone(),
            domain: self.domain.clone(),
            env: self.env.clone(),
            port: self.port,
            publish_all_ports: self.publish_all,
            volumes: self.volumes.clone(),
            min: self.min,
            max: self.max,
            desired: self.desired,
            autorecovery: self.autorecovery,
            anti_affinity: self.anti_affinity,
            session_affinity: self.session_affinity,
            http_monitor: self.http_monitor,
            http_monitor_path: self.http_monitor_path.clone(),
            http_monitor_rc_list: self.http_monitor_rc_list.clone(),
            floating_ip: self.floating_ip.clone(),
            cmd: self.cmd.clone(),
            memory: self.memory,
            ..GroupOptions::new(self.name.clone(), self.image.clone())
        }
    }
}

/// Arguments naming a single group.
#[derive(Debug, Clone, Args)]
pub struct GroupNameArgs {
    /// Name of the group.
    #[arg(required = true)]
    pub name: String,
}

/// Arguments for the `service-credentials` subcommand.
#[derive(Debug, Clone, Args)]
pub struct ServiceCredentialsArgs {
    /// Service offering name, as listed by `cf marketplace`.
    #[arg(required = true)]
    pub service: String,

    /// Application whose binding supplies the credentials.
    #[arg(long)]
    pub app: Option<String>,

    /// Plan used when the service instance has to be created.
    #[arg(long, default_value = DEFAULT_SERVICE_PLAN)]
    pub plan: String,

    /// Read credentials from a service key instead of a binding.
    #[arg(long)]
    pub non_binding: bool,

    /// Service key to create when the instance has none.
    #[arg(long, default_value = DEFAULT_SERVICE_KEY)]
    pub key_name: String,
}

impl ServiceCredentialsArgs {
    /// Convert the parsed flags into a library request.
    #[must_use]
    pub fn to_credentials_request(&self) -> CredentialsRequest {
        CredentialsRequest {
            service: self.service.clone(),
            app: self.app.clone(),
            plan: self.plan.clone(),
            non_binding: self.non_binding,
            key_name: self.key_name.clone(),
        }
    }
}
