//! Assertion helpers for group lifecycle behavioural tests.

use std::time::Duration;

use rstest_bdd_macros::then;

use super::StepResult;
use super::state::{LifecycleResult, LifecycleState};

fn output(lifecycle_state: &LifecycleState) -> StepResult<String> {
    match lifecycle_state.result.get() {
        Some(LifecycleResult::Ok(outcome)) => Ok(outcome.output().to_owned()),
        Some(LifecycleResult::Err(message)) => Err(format!("expected success, got: {message}")),
        None => Err(String::from("result should be set")),
    }
}

#[then("the final status is {status}")]
fn final_status_is(lifecycle_state: &LifecycleState, status: String) -> StepResult<()> {
    let text = output(lifecycle_state)?;
    let document: serde_json::Value =
        serde_json::from_str(&text).map_err(|error| format!("output is not JSON: {error}"))?;
    match document.get("Status").and_then(serde_json::Value::as_str) {
        Some(actual) if actual == status => Ok(()),
        other => Err(format!("expected status {status}, got {other:?}")),
    }
}

#[then("the poller slept {seconds} seconds")]
fn poller_slept(lifecycle_state: &LifecycleState, seconds: String) -> StepResult<()> {
    let expected = seconds
        .split(',')
        .map(|part| part.trim().parse::<u64>().map(Duration::from_secs))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| format!("bad duration list '{seconds}': {error}"))?;
    let actual = lifecycle_state.naps.get().unwrap_or_default();
    if actual == expected {
        Ok(())
    } else {
        Err(format!("expected naps {expected:?}, got {actual:?}"))
    }
}

#[then("the cf command {command} ran {count} times")]
fn cf_ran(lifecycle_state: &LifecycleState, command: String, count: usize) -> StepResult<()> {
    let line = format!("cf {command}");
    let calls = lifecycle_state.calls.get().unwrap_or_default();
    let actual = calls.iter().filter(|call| **call == line).count();
    if actual == count && actual == calls.len() {
        Ok(())
    } else {
        Err(format!("expected '{line}' {count} times, got {calls:?}"))
    }
}

#[then("cf was never run")]
fn cf_never_run(lifecycle_state: &LifecycleState) -> StepResult<()> {
    let calls = lifecycle_state.calls.get().unwrap_or_default();
    if calls.is_empty() {
        Ok(())
    } else {
        Err(format!("expected no cf calls, got {calls:?}"))
    }
}

#[then("the command fails mentioning {text}")]
fn command_fails_mentioning(lifecycle_state: &LifecycleState, text: String) -> StepResult<()> {
    match lifecycle_state.result.get() {
        Some(LifecycleResult::Err(message)) if message.contains(&text) => Ok(()),
        other => Err(format!("expected an error mentioning '{text}', got {other:?}")),
    }
}

#[then("the command output is {expected}")]
fn command_output_is(lifecycle_state: &LifecycleState, expected: String) -> StepResult<()> {
    let actual = output(lifecycle_state)?;
    if actual == expected {
        Ok(())
    } else {
        Err(format!("expected output '{expected}', got '{actual}'"))
    }
}

#[then("the command output contains {fragment}")]
fn command_output_contains(lifecycle_state: &LifecycleState, fragment: String) -> StepResult<()> {
    let actual = output(lifecycle_state)?;
    if actual.contains(&fragment) {
        Ok(())
    } else {
        Err(format!("expected output containing '{fragment}', got '{actual}'"))
    }
}

#[then("at most {seconds} seconds remain")]
fn at_most_remain(lifecycle_state: &LifecycleState, seconds: u64) -> StepResult<()> {
    let remaining: u64 = output(lifecycle_state)?
        .parse()
        .map_err(|error| format!("remaining wait is not a number: {error}"))?;
    if remaining <= seconds && remaining + 5 >= seconds {
        Ok(())
    } else {
        Err(format!("expected about {seconds} seconds, got {remaining}"))
    }
}
