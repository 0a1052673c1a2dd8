//! Service credential lookup orchestration.

use tracing::info;

use super::{CommandOutcome, InvocationContext};
use crate::error::Result as IcGroupResult;
use crate::platform::CommandRunner;
use crate::platform::inspect::sorted_pretty_json;
use crate::platform::services::ServiceSpace;

/// Which service's credentials to fetch, and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialsRequest {
    /// Service offering name, as listed by `cf marketplace`.
    pub service: String,
    /// Application whose binding supplies the credentials.
    pub app: Option<String>,
    /// Plan used when the service instance has to be created.
    pub plan: String,
    /// Read credentials from a service key instead of a binding.
    pub non_binding: bool,
    /// Service key to create when the instance has none.
    pub key_name: String,
}

/// Fetch the credentials of a service in the targeted space.
///
/// With `non_binding` set the credentials come from a service key;
/// otherwise from the `VCAP_SERVICES` entry of a bound application. Missing
/// instances, bindings and keys are created only when the platform
/// configuration enables `setup_service_space`.
///
/// # Errors
///
/// Returns `PlatformError::ServiceUnavailable` when the service cannot be
/// found or bound, and `ExternalCommandFailed` / `MalformedOutput` when a
/// `cf` call fails or prints unparseable output.
pub fn service_credentials<R: CommandRunner, E: mockable::Env>(
    context: &InvocationContext<'_, R, E>,
    request: &CredentialsRequest,
) -> IcGroupResult<CommandOutcome> {
    let platform = &context.config.platform;
    let space = ServiceSpace::new(context.runner, context.cf_binary())
        .with_setup(platform.setup_service_space)
        .with_legacy_cli(platform.legacy_cli_path.clone());

    let credentials = if request.non_binding {
        space.credentials_for_non_binding_service(
            &request.service,
            &request.plan,
            &request.key_name,
        )?
    } else {
        space.credentials_from_bound_app(&request.service, request.app.as_deref(), &request.plan)?
    };

    info!(service = %request.service, "retrieved service credentials");
    Ok(CommandOutcome::completed(sorted_pretty_json(&credentials)))
}
