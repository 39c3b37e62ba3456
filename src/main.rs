use clap::Parser;
use dotenvy::var;
use s3deploy::{
    config::{parse_error_status, Cli, Command, DeployArgs, DeploymentRequest},
    deploy::deploy_with,
    error::ConfigError,
    setup,
    store::S3Store,
    EXIT_CONFIG_ERROR,
};
use std::process::ExitCode;

#[macro_use]
extern crate tracing;

fn init_sentry() -> sentry::ClientInitGuard {
    let dsn = match var("SENTRY_DSN") {
        Ok(x) => match x.parse() {
            Ok(x) => Some(x),
            Err(e) => {
                warn!(?e, "Error parsing sentry DSN");
                None
            }
        },
        Err(_) => None,
    };

    sentry::init(sentry::ClientOptions {
        dsn,
        release: sentry::release_name!(),
        ..Default::default()
    })
}

async fn run_deploy(args: DeployArgs) -> ExitCode {
    let request = match DeploymentRequest::try_from(args) {
        Ok(x) => x,
        Err(e) => {
            error!(%e, "Invalid arguments");
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    match deploy_with(&request, S3Store::new).await {
        Ok(report) => {
            println!("{}", report.summary());
            if !report.is_success() {
                error!(failed = report.failed.len(), "Some files were not uploaded");
                eprintln!("{}", report.failure_table());
            }
            ExitCode::from(report.exit_status())
        }
        Err(e @ ConfigError::StoreSetup(_)) => {
            error!(e = ?color_eyre::Report::new(e), "Error connecting to S3");
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
        Err(e) => {
            error!(%e, cause = ?std::error::Error::source(&e), "Error deploying");
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(x) => x,
        Err(e) => {
            //clap's own exit code for usage errors would collide with a partial upload
            if let Err(print_err) = e.print() {
                eprintln!("Error printing usage: {print_err:?}");
            }
            return ExitCode::from(parse_error_status(&e));
        }
    };
    setup();
    let _sentry = init_sentry();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("unable to build runtime");

    match cli.command {
        Command::Deploy(args) => runtime.block_on(run_deploy(args)),
    }
}
