//! Given/when steps for group lifecycle scenarios.

use icgroup::api::{
    CommandOutcome, CreateParams, InvocationContext, create_group, remaining_wait, remove_group,
    wait_for_group,
};
use icgroup::config::AppConfig;
use icgroup::error::Result as IcGroupResult;
use icgroup::request::GroupOptions;
use icgroup::submit::{GroupSubmitter, SubmitFuture, Submission};
use mockable::MockEnv;
use rstest_bdd_macros::{given, when};

use super::StepResult;
use super::state::{FakeCf, LifecycleResult, LifecycleState, NapLog, Reply};

/// Submitter for flows that must never reach the network.
struct RefusingSubmitter;

impl GroupSubmitter for RefusingSubmitter {
    fn post(&self, submission: Submission) -> SubmitFuture<'_> {
        panic!("unexpected submission to {}", submission.url)
    }
}

fn push_reply(lifecycle_state: &LifecycleState, reply: Reply) -> StepResult<()> {
    let mut replies = lifecycle_state
        .replies
        .get()
        .ok_or_else(|| String::from("replies should be initialised"))?;
    replies.push(reply);
    lifecycle_state.replies.set(replies);
    Ok(())
}

/// Run `operation` against a fresh fake `cf` and capture everything in state.
fn invoke<F>(lifecycle_state: &LifecycleState, operation: F) -> StepResult<()>
where
    F: FnOnce(&InvocationContext<'_, FakeCf, MockEnv>, &NapLog) -> IcGroupResult<CommandOutcome>,
{
    let config: AppConfig = lifecycle_state
        .config
        .get()
        .ok_or_else(|| String::from("config should be initialised"))?;
    let runner = FakeCf::new(lifecycle_state.replies.get().unwrap_or_default());
    let env = MockEnv::new();
    let sleeper = NapLog::default();
    let context = InvocationContext::new(&config, &runner, &env);

    let result = match operation(&context, &sleeper) {
        Ok(outcome) => LifecycleResult::Ok(outcome),
        Err(error) => LifecycleResult::Err(error.to_string()),
    };
    lifecycle_state.result.set(result);
    lifecycle_state.calls.set(runner.calls());
    lifecycle_state.naps.set(sleeper.naps());
    Ok(())
}

#[given("the group reports {status}")]
fn given_group_reports(lifecycle_state: &LifecycleState, status: String) -> StepResult<()> {
    push_reply(
        lifecycle_state,
        Reply {
            code: 0,
            stdout: format!(r#"{{"Name":"web","Status":"{status}"}}"#),
        },
    )
}

#[given("the next inspection fails")]
fn given_inspection_fails(lifecycle_state: &LifecycleState) -> StepResult<()> {
    push_reply(
        lifecycle_state,
        Reply {
            code: 1,
            stdout: String::new(),
        },
    )
}

#[given("cf prints {text}")]
fn given_cf_prints(lifecycle_state: &LifecycleState, text: String) -> StepResult<()> {
    push_reply(
        lifecycle_state,
        Reply {
            code: 0,
            stdout: format!("{text}\n"),
        },
    )
}

#[given("a wait time of {minutes} minutes with {seconds} seconds already spent")]
fn given_wait_time(
    lifecycle_state: &LifecycleState,
    minutes: u64,
    seconds: u64,
) -> StepResult<()> {
    let mut config = lifecycle_state
        .config
        .get()
        .ok_or_else(|| String::from("config should be initialised"))?;
    config.timing.wait_time_minutes = minutes;
    config.timing.init_time_secs = seconds;
    lifecycle_state.config.set(config);
    Ok(())
}

#[when("the group {name} is awaited")]
fn when_awaited(lifecycle_state: &LifecycleState, name: String) -> StepResult<()> {
    invoke(lifecycle_state, |context, sleeper| {
        wait_for_group(context, sleeper, &name)
    })
}

#[when("the group {name} is removed")]
fn when_removed(lifecycle_state: &LifecycleState, name: String) -> StepResult<()> {
    invoke(lifecycle_state, |context, _| remove_group(context, &name))
}

#[when("a dry run creates the group {name}")]
fn when_dry_run(lifecycle_state: &LifecycleState, name: String) -> StepResult<()> {
    let runtime = tokio::runtime::Runtime::new().map_err(|error| error.to_string())?;
    let options = GroupOptions::new(name, "registry.ng.bluemix.net/acme/web:1");
    invoke(lifecycle_state, |context, _| {
        create_group(
            context,
            CreateParams {
                options: &options,
                dry_run: true,
                submitter: &RefusingSubmitter,
                runtime_handle: runtime.handle(),
            },
        )
    })
}

#[when("the remaining wait is requested")]
fn when_remaining_wait(lifecycle_state: &LifecycleState) -> StepResult<()> {
    invoke(lifecycle_state, |context, _| remaining_wait(context))
}
