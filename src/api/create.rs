//! Group creation orchestration.

use tracing::info;

use super::{CommandOutcome, InvocationContext};
use crate::error::Result as IcGroupResult;
use crate::platform::CommandRunner;
use crate::platform::auth::{credentials_path, load_auth_info};
use crate::platform::endpoints::resolve_endpoints;
use crate::request::{GroupOptions, build_creation_request};
use crate::submit::{GroupSubmitter, Submission, submit_group};

/// Parameters for creating a group.
pub struct CreateParams<'a, S: GroupSubmitter> {
    /// The group to create.
    pub options: &'a GroupOptions,
    /// Build and return the body without contacting the platform.
    pub dry_run: bool,
    /// Transport for the creation request.
    pub submitter: &'a S,
    /// Tokio runtime handle for blocking on the submission.
    pub runtime_handle: &'a tokio::runtime::Handle,
}

/// Build a creation request and submit it to the containers API.
///
/// The request is built before any platform access, so invalid options fail
/// without touching the credential store or the `cf` CLI. On success the
/// API's response body is returned.
///
/// # Errors
///
/// Returns `IcGroupError` variants:
/// - `RequestError::InvalidArgument` if the options are rejected.
/// - `PlatformError::AuthUnavailable` if the credential file is unusable.
/// - `PlatformError::EndpointUnavailable` if `cf api` yields no endpoint.
/// - `SubmitError::RemoteRejected` / `TransportFailed` from the submission.
pub fn create_group<R, E, S>(
    context: &InvocationContext<'_, R, E>,
    params: CreateParams<'_, S>,
) -> IcGroupResult<CommandOutcome>
where
    R: CommandRunner,
    E: mockable::Env,
    S: GroupSubmitter,
{
    let CreateParams {
        options,
        dry_run,
        submitter,
        runtime_handle,
    } = params;

    let body = build_creation_request(options)?.to_wire_body()?;
    if dry_run {
        info!(group = %options.name, "dry run; request not submitted");
        return Ok(CommandOutcome::DryRun { body });
    }

    let platform = &context.config.platform;
    let path = credentials_path(platform.credentials_path.as_deref(), context.env)?;
    let auth = load_auth_info(&path)?;
    let endpoints = resolve_endpoints(context.runner, context.cf_binary())?;

    let submission = Submission {
        url: endpoints.groups_url(platform.api_port),
        body,
        token: auth.bearer_token,
        space_id: auth.space_guid,
    };
    info!(group = %options.name, url = %submission.url, "creating group");
    let response = submit_group(runtime_handle, submitter, &submission)?;
    Ok(CommandOutcome::completed(response))
}
