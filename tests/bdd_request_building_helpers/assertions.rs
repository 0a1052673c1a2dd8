//! Assertion helpers for request building behavioural tests.

use icgroup::request::{CreationRequest, FieldValue};
use rstest_bdd_macros::then;

use super::StepResult;
use super::state::{BuildResult, RequestState};

fn built(request_state: &RequestState) -> StepResult<CreationRequest> {
    match request_state.result.get() {
        Some(BuildResult::Built(request)) => Ok(*request),
        Some(BuildResult::Rejected { field }) => {
            Err(format!("expected a request, builder rejected {field}"))
        }
        None => Err(String::from("the request should have been built")),
    }
}

fn expect_text(request: &CreationRequest, key: &str, expected: &str) -> StepResult<()> {
    match request.get(key).and_then(FieldValue::as_text) {
        Some(actual) if actual == expected => Ok(()),
        other => Err(format!("expected {key} = {expected:?}, got {other:?}")),
    }
}

#[then("the instance counts are min {min}, max {max}, desired {desired}")]
fn instance_counts_are(
    request_state: &RequestState,
    min: String,
    max: String,
    desired: String,
) -> StepResult<()> {
    let request = built(request_state)?;
    let counts = request
        .number_instances()
        .ok_or_else(|| String::from("NumberInstances should be present"))?;
    let actual = (
        counts.get("Min").map(String::as_str),
        counts.get("Max").map(String::as_str),
        counts.get("Desired").map(String::as_str),
    );
    let expected = (
        Some(min.as_str()),
        Some(max.as_str()),
        Some(desired.as_str()),
    );
    if actual == expected {
        Ok(())
    } else {
        Err(format!("expected {expected:?}, got {actual:?}"))
    }
}

#[then("the field {key} is the empty string")]
fn field_is_empty(request_state: &RequestState, key: String) -> StepResult<()> {
    expect_text(&built(request_state)?, &key, "")
}

#[then("the field {key} is omitted")]
fn field_is_absent(request_state: &RequestState, key: String) -> StepResult<()> {
    let request = built(request_state)?;
    match request.get(&key) {
        None => Ok(()),
        Some(value) => Err(format!("expected {key} to be absent, got {value:?}")),
    }
}

#[then("the field {key} has value {expected}")]
fn field_is(request_state: &RequestState, key: String, expected: String) -> StepResult<()> {
    expect_text(&built(request_state)?, &key, &expected)
}

#[then("the route is host {host} on domain {domain}")]
fn route_is(request_state: &RequestState, host: String, domain: String) -> StepResult<()> {
    let request = built(request_state)?;
    let route = request
        .route()
        .ok_or_else(|| String::from("Route should be present"))?;
    if route.get("host") == Some(&host) && route.get("domain") == Some(&domain) {
        Ok(())
    } else {
        Err(format!("unexpected route: {route:?}"))
    }
}

#[then("the request is rejected for {field}")]
fn request_is_rejected(request_state: &RequestState, field: String) -> StepResult<()> {
    match request_state.result.get() {
        Some(BuildResult::Rejected { field: actual }) if actual == field => Ok(()),
        other => Err(format!("expected rejection of {field}, got {other:?}")),
    }
}

#[then("the wire body keys are in sorted order")]
fn wire_body_sorted(request_state: &RequestState) -> StepResult<()> {
    let request = built(request_state)?;
    let body = request.to_wire_body().map_err(|error| error.to_string())?;
    if body.contains(": ") || body.contains('\n') {
        return Err(format!("wire body is not compact: {body}"));
    }
    let keys: Vec<&str> = request.keys().collect();
    let positions: Vec<usize> = keys
        .iter()
        .map(|key| body.find(&format!("\"{key}\":")).unwrap_or(usize::MAX))
        .collect();
    if positions.windows(2).all(|pair| pair.first() < pair.last()) {
        Ok(())
    } else {
        Err(format!("keys out of order in {body}"))
    }
}
