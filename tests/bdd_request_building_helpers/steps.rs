//! Given/when steps for request building scenarios.

use icgroup::error::RequestError;
use icgroup::request::{GroupOptions, build_creation_request};
use rstest_bdd_macros::{given, when};

use super::StepResult;
use super::state::{BuildResult, RequestState};

/// Apply `change` to the options held in state.
fn update_options<F>(request_state: &RequestState, change: F) -> StepResult<()>
where
    F: FnOnce(&mut GroupOptions),
{
    let mut options = request_state
        .options
        .get()
        .ok_or_else(|| String::from("group options should be initialised"))?;
    change(&mut options);
    request_state.options.set(options);
    Ok(())
}

#[given("a group named {name} running image {image}")]
fn given_group(request_state: &RequestState, name: String, image: String) {
    request_state.options.set(GroupOptions::new(name, image));
}

#[given("desired instances of {count}")]
fn given_desired(request_state: &RequestState, count: u32) -> StepResult<()> {
    update_options(request_state, |options| options.desired = Some(count))
}

#[given("minimum instances of {count}")]
fn given_min(request_state: &RequestState, count: u32) -> StepResult<()> {
    update_options(request_state, |options| options.min = Some(count))
}

#[given("maximum instances of {count}")]
fn given_max(request_state: &RequestState, count: u32) -> StepResult<()> {
    update_options(request_state, |options| options.max = Some(count))
}

#[given("the route host {host} on domain {domain}")]
fn given_route(request_state: &RequestState, host: String, domain: String) -> StepResult<()> {
    update_options(request_state, |options| {
        options.host = Some(host);
        options.domain = Some(domain);
    })
}

#[given("publish all ports is {flag}")]
fn given_publish_all(request_state: &RequestState, flag: bool) -> StepResult<()> {
    update_options(request_state, |options| options.publish_all_ports = Some(flag))
}

#[given("autorecovery is enabled")]
fn given_autorecovery(request_state: &RequestState) -> StepResult<()> {
    update_options(request_state, |options| options.autorecovery = true)
}

#[given("a memory size of {megabytes}")]
fn given_memory(request_state: &RequestState, megabytes: u32) -> StepResult<()> {
    update_options(request_state, |options| options.memory = megabytes)
}

#[when("the creation request is built")]
fn when_built(request_state: &RequestState) -> StepResult<()> {
    let options = request_state
        .options
        .get()
        .ok_or_else(|| String::from("group options should be initialised"))?;
    let result = match build_creation_request(&options) {
        Ok(request) => BuildResult::Built(Box::new(request)),
        Err(RequestError::InvalidArgument { field, .. }) => BuildResult::Rejected { field },
        Err(other) => return Err(format!("unexpected builder error: {other}")),
    };
    request_state.result.set(result);
    Ok(())
}
