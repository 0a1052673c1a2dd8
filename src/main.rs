//! `icgroup` application entry point.
//!
//! This binary creates and manages IBM Containers groups. It uses `eyre` for
//! opaque error handling at the application boundary, converting
//! domain-specific errors into human-readable reports; any error exits with
//! status 1.
//!
//! Configuration is loaded with layered precedence via `OrthoConfig`:
//! 1. Application defaults
//! 2. Configuration file (`~/.config/icgroup/config.toml` or path from `ICGROUP_CONFIG_PATH`)
//! 3. Environment variables (`ICGROUP_*` and the pipeline variables)
//! 4. Command-line arguments

use clap::Parser;
use eyre::{Report, Result as EyreResult};
use icgroup::api::{
    CommandOutcome, CreateParams, InvocationContext, create_group, inspect_group,
    remaining_wait, remove_group, service_credentials, show_endpoints, wait_for_group,
};
use icgroup::config::{AppConfig, Cli, Commands, CreateArgs, load_config};
use icgroup::error::{Result as IcGroupResult, SubmitError};
use icgroup::logging::init_logging;
use icgroup::platform::SystemCommandRunner;
use icgroup::platform::inspect::ThreadSleeper;
use icgroup::submit::HttpSubmitter;
use mockable::DefaultEnv;

/// Application entry point.
///
/// Loads configuration, installs logging, then dispatches to the
/// orchestration function for the subcommand.
fn main() -> EyreResult<()> {
    let cli = Cli::parse();
    let config = load_config(&cli).map_err(Report::from)?;
    init_logging(&config.logging).map_err(Report::from)?;

    let outcome = run(&cli, &config).map_err(Report::from)?;
    print_outcome(&outcome);
    Ok(())
}

/// Execute the CLI command, returning domain-specific errors.
///
/// Keeps semantic errors inside the run loop so the CLI boundary owns
/// conversion to `eyre::Report`.
fn run(cli: &Cli, config: &AppConfig) -> IcGroupResult<CommandOutcome> {
    let runner = SystemCommandRunner;
    let env = DefaultEnv::new();
    let context = InvocationContext::new(config, &runner, &env);

    match &cli.command {
        Commands::Create(args) => create(&context, args),
        Commands::Inspect(args) => inspect_group(&context, &args.name),
        Commands::Wait(args) => wait_for_group(&context, &ThreadSleeper, &args.name),
        Commands::Rm(args) => remove_group(&context, &args.name),
        Commands::Endpoints => show_endpoints(&context),
        Commands::RemainingWait => remaining_wait(&context),
        Commands::ServiceCredentials(args) => {
            service_credentials(&context, &args.to_credentials_request())
        }
    }
}

/// Build and submit a creation request on a dedicated runtime.
fn create(
    context: &InvocationContext<'_, SystemCommandRunner, DefaultEnv>,
    args: &CreateArgs,
) -> IcGroupResult<CommandOutcome> {
    let runtime =
        tokio::runtime::Runtime::new().map_err(|error| SubmitError::RuntimeCreationFailed {
            message: error.to_string(),
        })?;
    let options = args.to_group_options();
    let submitter = HttpSubmitter::new();

    create_group(
        context,
        CreateParams {
            options: &options,
            dry_run: args.dry_run,
            submitter: &submitter,
            runtime_handle: runtime.handle(),
        },
    )
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_outcome(outcome: &CommandOutcome) {
    let output = outcome.output();
    if !output.is_empty() {
        println!("{output}");
    }
}
