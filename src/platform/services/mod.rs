//! Service instances, bindings, and credentials in the targeted space.
//!
//! Some container images need credentials for a platform service (for example
//! a vulnerability analyser). They are obtained either from the
//! `VCAP_SERVICES` environment of an application bound to the service, or
//! from a service key for brokers that do not support binding. When
//! `setup_service_space` is enabled, missing service instances, bindings, and
//! keys are created on demand; a small never-started bridge application is
//! pushed to hold bindings when no other application is available.

pub mod table;

use camino::Utf8PathBuf;
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::{CommandRunner, command_line, owned_args};
use crate::error::PlatformError;

/// Name of the placeholder application used to hold service bindings.
pub const BRIDGE_APP_NAME: &str = "pipeline_bridge_app";

/// Plan used when creating a service instance.
pub const DEFAULT_SERVICE_PLAN: &str = "free";

/// Name of the service key created for non-binding brokers.
pub const DEFAULT_SERVICE_KEY: &str = "pipeline_service_key";

const BRIDGE_PUSH_ARGS: &[&str] = &[
    "-i",
    "1",
    "-d",
    "mybluemix.net",
    "-k",
    "1M",
    "-m",
    "64M",
    "--no-hostname",
    "--no-manifest",
    "--no-route",
    "--no-start",
];

/// `cf` operations on the services of the targeted space.
pub struct ServiceSpace<'a, R: CommandRunner> {
    runner: &'a R,
    cf_binary: String,
    setup_space: bool,
    legacy_cli: Option<Utf8PathBuf>,
}

impl<'a, R: CommandRunner> ServiceSpace<'a, R> {
    /// Create an adapter running `cf_binary` through `runner`.
    ///
    /// Missing instances and bindings are not created unless
    /// [`Self::with_setup`] enables it.
    #[must_use]
    pub fn new(runner: &'a R, cf_binary: impl Into<String>) -> Self {
        Self {
            runner,
            cf_binary: cf_binary.into(),
            setup_space: false,
            legacy_cli: None,
        }
    }

    /// Allow creating service instances, bindings, and keys on demand.
    #[must_use]
    pub const fn with_setup(mut self, setup_space: bool) -> Self {
        self.setup_space = setup_space;
        self
    }

    /// CLI used to push the bridge application when the file exists.
    #[must_use]
    pub fn with_legacy_cli(mut self, path: Option<Utf8PathBuf>) -> Self {
        self.legacy_cli = path;
        self
    }

    fn run(&self, args: &[String]) -> Result<super::CommandOutput, PlatformError> {
        self.runner.run(&self.cf_binary, args)
    }

    fn run_checked(&self, args: &[String]) -> Result<String, PlatformError> {
        let output = self.run(args)?.into_success(&self.cf_binary, args)?;
        Ok(output.stdout)
    }

    fn services_row(&self, service: &str) -> Result<Option<table::ServiceRow>, PlatformError> {
        let args = owned_args(&["services"]);
        let output = self.run(&args)?;
        if !output.success() {
            info!(
                service,
                stderr = %output.stderr.trim(),
                "unable to list services"
            );
            return Ok(None);
        }
        Ok(table::find_service_row(&output.stdout, service))
    }

    /// Name of the instance of `service` in the space, if any.
    ///
    /// A failing `cf services` is logged and treated as "not found".
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::CommandSpawnFailed`] if the CLI cannot run.
    pub fn find_service_name(&self, service: &str) -> Result<Option<String>, PlatformError> {
        Ok(self.services_row(service)?.map(|row| row.name))
    }

    /// First application bound to the instance of `service`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::CommandSpawnFailed`] if the CLI cannot run.
    pub fn find_bound_app(&self, service: &str) -> Result<Option<String>, PlatformError> {
        let app = self
            .services_row(service)?
            .and_then(|row| row.first_bound_app().map(str::to_owned));
        match &app {
            Some(name) => debug!(service, app = %name, "found bound application"),
            None => debug!(service, "no application bound to service"),
        }
        Ok(app)
    }

    /// Dashboard URL of the instance of `service`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::CommandSpawnFailed`] if the CLI cannot run.
    pub fn service_dashboard(&self, service: &str) -> Result<Option<String>, PlatformError> {
        let Some(name) = self.find_service_name(service)? else {
            return Ok(None);
        };
        let output = self.run(&owned_args(&["service", &name]))?;
        if !output.success() {
            return Ok(None);
        }
        Ok(table::dashboard_url(&output.stdout).map(str::to_owned))
    }

    /// Make sure the bridge application exists, pushing it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::ExternalCommandFailed`] if listing or pushing
    /// applications fails.
    pub fn ensure_bridge_app(&self) -> Result<(), PlatformError> {
        let apps = self.run_checked(&owned_args(&["apps"]))?;
        let marker = format!("{BRIDGE_APP_NAME} ");
        if apps.lines().any(|line| line.starts_with(&marker)) {
            return Ok(());
        }

        let program = self
            .legacy_cli
            .as_ref()
            .filter(|path| path.is_file())
            .map_or_else(|| self.cf_binary.clone(), ToString::to_string);
        let args: Vec<String> = ["push", BRIDGE_APP_NAME]
            .iter()
            .chain(BRIDGE_PUSH_ARGS)
            .map(|arg| (*arg).to_owned())
            .collect();
        info!(command = %command_line(&program, &args), "creating bridge application");
        self.runner
            .run(&program, &args)?
            .into_success(&program, &args)?;
        Ok(())
    }

    /// Instance name of `service`, creating it under `plan` when absent.
    ///
    /// A created instance is named after the service.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::ExternalCommandFailed`] if creation fails.
    pub fn get_or_create_service(
        &self,
        service: &str,
        plan: &str,
    ) -> Result<String, PlatformError> {
        if let Some(name) = self.find_service_name(service)? {
            return Ok(name);
        }
        info!(service, plan, "service is not in this space, creating it");
        self.run_checked(&owned_args(&["create-service", service, plan, service]))?;
        Ok(service.to_owned())
    }

    /// Bind `app` to the instance of `service`, creating the instance first
    /// when absent. Binding an already bound application is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::ExternalCommandFailed`] if any step fails.
    pub fn bind_app_to_service(
        &self,
        app: &str,
        service: &str,
        plan: &str,
    ) -> Result<String, PlatformError> {
        let name = self.get_or_create_service(service, plan)?;
        info!(service = %name, app, "binding service to application");
        self.run_checked(&owned_args(&["bind-service", app, &name]))?;
        Ok(app.to_owned())
    }

    /// Bind the instance of `service` to the bridge application, creating
    /// both as needed. Returns the bridge application name.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::ExternalCommandFailed`] if any step fails.
    pub fn create_bound_app(&self, service: &str, plan: &str) -> Result<String, PlatformError> {
        self.ensure_bridge_app()?;
        self.bind_app_to_service(BRIDGE_APP_NAME, service, plan)
    }

    /// Credentials of `service` from the environment of a bound application.
    ///
    /// Without an explicit `app`, the first bound application is used; when
    /// there is none and space setup is enabled, the bridge application is
    /// bound. With an explicit `app` and space setup enabled, the binding is
    /// (re)applied first.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::ServiceUnavailable`] when no bound application
    /// can be found or its environment lacks
    /// `VCAP_SERVICES[service][0].credentials`, and
    /// [`PlatformError::MalformedOutput`] when `cf env` prints invalid JSON.
    pub fn credentials_from_bound_app(
        &self,
        service: &str,
        app: Option<&str>,
        plan: &str,
    ) -> Result<Value, PlatformError> {
        let binding_app = match app {
            Some(name) if self.setup_space => self.bind_app_to_service(name, service, plan)?,
            Some(name) => name.to_owned(),
            None => match self.find_bound_app(service)? {
                Some(found) => found,
                None if self.setup_space => self.create_bound_app(service, plan)?,
                None => {
                    return Err(unavailable(
                        service,
                        "service is not loaded and bound in this space; bind it to an \
                         application or enable service space setup",
                    ));
                }
            },
        };

        let args = owned_args(&["env", &binding_app]);
        let output = self.run_checked(&args)?;
        let environment = merged_environment(&command_line(&self.cf_binary, &args), &output)?;

        environment
            .get("VCAP_SERVICES")
            .and_then(|services| services.get(service))
            .and_then(|instances| instances.get(0))
            .and_then(|instance| instance.get("credentials"))
            .cloned()
            .ok_or_else(|| {
                unavailable(
                    service,
                    &format!("no bound credentials in the environment of '{binding_app}'"),
                )
            })
    }

    /// Credentials of `service` from a service key.
    ///
    /// The first existing key is used; when the instance has none, `key_name`
    /// is created. With space setup enabled the instance itself is created
    /// when absent.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::ServiceUnavailable`] when the instance or a key
    /// cannot be found, [`PlatformError::ExternalCommandFailed`] when a `cf`
    /// command fails, and [`PlatformError::MalformedOutput`] when the key is
    /// not valid JSON.
    pub fn credentials_for_non_binding_service(
        &self,
        service: &str,
        plan: &str,
        key_name: &str,
    ) -> Result<Value, PlatformError> {
        let instance = if self.setup_space {
            self.get_or_create_service(service, plan)?
        } else {
            self.find_service_name(service)?
                .ok_or_else(|| unavailable(service, "service is not loaded in this space"))?
        };

        let list_args = owned_args(&["service-keys", &instance]);
        let mut keys = self.run_checked(&list_args)?;
        if table::first_service_key(&keys).is_none() {
            info!(service = %instance, key = key_name, "creating service key");
            self.run_checked(&owned_args(&["create-service-key", &instance, key_name]))?;
            keys = self.run_checked(&list_args)?;
        }
        let key = table::first_service_key(&keys)
            .ok_or_else(|| {
                unavailable(service, &format!("no service key for instance '{instance}'"))
            })?
            .to_owned();

        let args = owned_args(&["service-key", &instance, &key]);
        let output = self.run_checked(&args)?;
        serde_json::from_str(&table::service_key_body(&output)).map_err(|error| {
            PlatformError::MalformedOutput {
                command: command_line(&self.cf_binary, &args),
                message: error.to_string(),
            }
        })
    }
}

fn merged_environment(command: &str, output: &str) -> Result<Map<String, Value>, PlatformError> {
    let mut merged = Map::new();
    for block in table::json_blocks(output) {
        let parsed: Map<String, Value> =
            serde_json::from_str(&block).map_err(|error| PlatformError::MalformedOutput {
                command: command.to_owned(),
                message: error.to_string(),
            })?;
        merged.extend(parsed);
    }
    Ok(merged)
}

fn unavailable(service: &str, message: &str) -> PlatformError {
    PlatformError::ServiceUnavailable {
        service: service.to_owned(),
        message: message.to_owned(),
    }
}
