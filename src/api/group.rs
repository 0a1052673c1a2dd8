//! Group inspection, polling, removal and endpoint reporting.

use tracing::info;

use super::{CommandOutcome, InvocationContext};
use crate::error::Result as IcGroupResult;
use crate::platform::CommandRunner;
use crate::platform::endpoints::resolve_endpoints;
use crate::platform::inspect::{GroupClient, Sleeper};

/// Inspect a group once.
///
/// # Errors
///
/// Returns `PlatformError::ExternalCommandFailed` or `MalformedOutput` when
/// `cf ic group inspect` fails or prints something other than a JSON object.
pub fn inspect_group<R: CommandRunner, E: mockable::Env>(
    context: &InvocationContext<'_, R, E>,
    name: &str,
) -> IcGroupResult<CommandOutcome> {
    let document = GroupClient::new(context.runner, context.cf_binary()).inspect(name)?;
    Ok(CommandOutcome::completed(document.to_pretty_json()))
}

/// Poll a group until it leaves `CREATE_IN_PROGRESS`.
///
/// Uses the configured initial wait and poll interval.
///
/// # Errors
///
/// Propagates the inspection failure that ends polling; see
/// [`GroupClient::wait_until_settled`].
pub fn wait_for_group<R, E, S>(
    context: &InvocationContext<'_, R, E>,
    sleeper: &S,
    name: &str,
) -> IcGroupResult<CommandOutcome>
where
    R: CommandRunner,
    E: mockable::Env,
    S: Sleeper,
{
    let client = GroupClient::new(context.runner, context.cf_binary());
    let document = client.wait_until_settled(sleeper, context.poll_policy(), name)?;
    Ok(CommandOutcome::completed(document.to_pretty_json()))
}

/// Force-remove a group.
///
/// # Errors
///
/// Returns `PlatformError::ExternalCommandFailed` when `cf ic group rm`
/// exits non-zero.
pub fn remove_group<R: CommandRunner, E: mockable::Env>(
    context: &InvocationContext<'_, R, E>,
    name: &str,
) -> IcGroupResult<CommandOutcome> {
    let stdout = GroupClient::new(context.runner, context.cf_binary()).remove(name)?;
    Ok(CommandOutcome::completed(stdout.trim()))
}

/// Report the control-plane and containers API URLs.
///
/// # Errors
///
/// Returns `PlatformError::EndpointUnavailable` when `cf api` yields no
/// endpoint.
pub fn show_endpoints<R: CommandRunner, E: mockable::Env>(
    context: &InvocationContext<'_, R, E>,
) -> IcGroupResult<CommandOutcome> {
    let endpoints = resolve_endpoints(context.runner, context.cf_binary())?;
    Ok(CommandOutcome::completed(format!(
        "{}\n{}",
        endpoints.control_plane, endpoints.containers
    )))
}

/// Report the remaining wait budget in whole seconds.
///
/// # Errors
///
/// Never fails; the `Result` keeps the signature uniform with the other
/// commands.
pub fn remaining_wait<R: CommandRunner, E: mockable::Env>(
    context: &InvocationContext<'_, R, E>,
) -> IcGroupResult<CommandOutcome> {
    let remaining = context.remaining_wait();
    info!(seconds = remaining.as_secs(), "remaining wait budget");
    Ok(CommandOutcome::completed(remaining.as_secs().to_string()))
}
