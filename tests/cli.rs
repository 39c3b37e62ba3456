use clap::Parser;
use s3deploy::{
    config::{parse_error_status, Cli, Command, DeployArgs, DeploymentRequest},
    error::ConfigError,
    EXIT_CONFIG_ERROR, EXIT_PARTIAL_FAILURE,
};
use std::path::Path;

fn deploy_args(args: &[&str]) -> DeployArgs {
    let cli = Cli::try_parse_from(std::iter::once("s3deploy").chain(args.iter().copied()))
        .expect("args should parse");
    match cli.command {
        Command::Deploy(args) => args,
    }
}

#[test]
fn long_flags() {
    let args = deploy_args(&[
        "deploy",
        "--source",
        "./site",
        "--bucket",
        "my-bucket",
        "--key",
        "AKIA",
        "--secret",
        "shh",
        "--region",
        "us-east-1",
    ]);

    assert_eq!(args.source, Path::new("./site"));
    assert_eq!(args.bucket, "my-bucket");
    assert_eq!(args.key, "AKIA");
    assert_eq!(args.secret, "shh");
    assert_eq!(args.region, "us-east-1");
}

#[test]
fn short_flags() {
    let args = deploy_args(&[
        "deploy", "-s", "public", "-b", "bkt", "-k", "id", "-x", "pw", "-r", "ap-south-1", "-j",
        "8",
    ]);

    assert_eq!(args.source, Path::new("public"));
    assert_eq!(args.bucket, "bkt");
    assert_eq!(args.key, "id");
    assert_eq!(args.secret, "pw");
    assert_eq!(args.region, "ap-south-1");
    assert_eq!(args.concurrency.get(), 8);
}

#[test]
fn sequential_by_default() {
    let args = deploy_args(&["deploy", "-s", "public", "-b", "bkt"]);

    assert_eq!(args.concurrency.get(), 1);
}

#[test]
fn source_required() {
    assert!(Cli::try_parse_from(["s3deploy", "deploy", "-b", "bkt"]).is_err());
}

#[test]
fn usage_errors_are_config_errors() {
    let Err(missing_source) = Cli::try_parse_from(["s3deploy", "deploy", "-b", "bkt"]) else {
        panic!("missing --source should not parse");
    };
    assert_eq!(parse_error_status(&missing_source), EXIT_CONFIG_ERROR);
    assert_ne!(parse_error_status(&missing_source), EXIT_PARTIAL_FAILURE);

    let Err(unknown_flag) = Cli::try_parse_from(["s3deploy", "deploy", "--nope"]) else {
        panic!("unknown flag should not parse");
    };
    assert_eq!(parse_error_status(&unknown_flag), EXIT_CONFIG_ERROR);

    let Err(no_command) = Cli::try_parse_from(["s3deploy"]) else {
        panic!("missing subcommand should not parse");
    };
    assert_eq!(parse_error_status(&no_command), EXIT_CONFIG_ERROR);
}

#[test]
fn help_and_version_exit_cleanly() {
    let Err(help) = Cli::try_parse_from(["s3deploy", "deploy", "--help"]) else {
        panic!("--help should short-circuit");
    };
    assert_eq!(parse_error_status(&help), 0);

    let Err(version) = Cli::try_parse_from(["s3deploy", "--version"]) else {
        panic!("--version should short-circuit");
    };
    assert_eq!(parse_error_status(&version), 0);
}

#[test]
fn zero_concurrency_rejected() {
    assert!(Cli::try_parse_from(["s3deploy", "deploy", "-s", "a", "-b", "b", "-j", "0"]).is_err());
}

#[test]
fn empty_bucket_is_a_config_error() {
    let args = deploy_args(&["deploy", "-s", "public", "-b", ""]);
    assert!(matches!(
        DeploymentRequest::try_from(args),
        Err(ConfigError::MissingBucket)
    ));
}
