//! Command-line parsing tests.

use crate::config::{Cli, Commands, CreateArgs};
use clap::Parser;
use rstest::rstest;

fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(std::iter::once("icgroup").chain(args.iter().copied()))
}

fn parse_create(args: &[&str]) -> CreateArgs {
    let mut full = vec!["create"];
    full.extend_from_slice(args);
    let cli = parse(&full).expect("create arguments should parse");
    match cli.command {
        Commands::Create(create) => create,
        other => panic!("expected create, got {other:?}"),
    }
}

#[rstest]
fn create_defaults_match_group_options() {
    let args = parse_create(&["--name", "web", "registry.example/web:1"]);
    let options = args.to_group_options();

    assert_eq!(options.name, "web");
    assert_eq!(options.image, "registry.example/web:1");
    assert_eq!(options.memory, 256);
    assert!(options.http_monitor);
    assert!(!options.autorecovery);
    assert!(!options.anti_affinity);
    assert!(!options.session_affinity);
    assert!(options.publish_all_ports.is_none());
    assert!(options.cmd.is_empty());
}

#[rstest]
fn create_collects_repeatable_and_trailing_arguments() {
    let args = parse_create(&[
        "--name", "web", "-n", "www", "-d", "example.net", "-e", "A=1", "-e", "B=2", "-v",
        "data:/srv", "-p", "8080", "--min", "2", "--max", "4", "--desired", "3", "--ip",
        "169.0.0.9", "img", "sh", "-c", "echo hi",
    ]);
    let options = args.to_group_options();

    assert_eq!(options.host.as_deref(), Some("www"));
    assert_eq!(options.domain.as_deref(), Some("example.net"));
    assert_eq!(options.env, vec!["A=1", "B=2"]);
    assert_eq!(options.volumes, vec!["data:/srv"]);
    assert_eq!(options.port, Some(8080));
    assert_eq!((options.min, options.max, options.desired), (Some(2), Some(4), Some(3)));
    assert_eq!(options.floating_ip.as_deref(), Some("169.0.0.9"));
    assert_eq!(options.cmd, vec!["sh", "-c", "echo hi"]);
}

#[rstest]
#[case::title("True", true)]
#[case::upper("FALSE", false)]
#[case::digit_one("1", true)]
#[case::digit_zero("0", false)]
fn create_accepts_boolean_literals(#[case] literal: &str, #[case] expected: bool) {
    let args = parse_create(&["--name", "web", "--auto", literal, "img"]);
    assert_eq!(args.autorecovery, expected);
}

#[rstest]
fn create_rejects_unknown_boolean_literal() {
    let result = parse(&["create", "--name", "web", "--anti", "yes", "img"]);
    assert!(result.is_err(), "'yes' is not an accepted literal");
}

#[rstest]
fn create_rejects_port_with_publish_all() {
    let result = parse(&["create", "--name", "web", "-p", "80", "-P", "true", "img"]);
    assert!(result.is_err(), "port and publish-all are mutually exclusive");
}

#[rstest]
fn create_requires_name_and_image() {
    assert!(parse(&["create", "img"]).is_err());
    assert!(parse(&["create", "--name", "web"]).is_err());
}

#[rstest]
fn global_cf_binary_flag_is_accepted_after_subcommand() {
    let cli = parse(&["inspect", "web", "--cf-binary", "/opt/cf"]).expect("should parse");
    assert_eq!(cli.cf_binary.as_deref(), Some("/opt/cf"));
    assert!(matches!(cli.command, Commands::Inspect(ref args) if args.name == "web"));
}

#[rstest]
fn service_credentials_defaults() {
    let cli = parse(&["service-credentials", "cloudantNoSQLDB"]).expect("should parse");
    let Commands::ServiceCredentials(args) = cli.command else {
        panic!("expected service-credentials");
    };
    assert_eq!(args.service, "cloudantNoSQLDB");
    assert_eq!(args.plan, "free");
    assert_eq!(args.key_name, "pipeline_service_key");
    assert!(!args.non_binding);
    assert!(args.app.is_none());
}
