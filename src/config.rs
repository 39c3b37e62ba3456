//! Command line surface, and the immutable request it gets turned into.

use crate::error::ConfigError;
use clap::{error::ErrorKind, Args, Parser, Subcommand};
use std::{
    fmt::{Debug, Formatter},
    num::NonZeroUsize,
    path::PathBuf,
};

pub const DEFAULT_REGION: &str = "eu-west-1";

#[derive(Parser)]
#[command(name = "s3deploy", version)]
#[command(about = "Uploads a directory to an S3 bucket under a fresh timestamp prefix")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Deploys the provided directory
    ///
    /// Uploads all files from the provided directory, including deeply nested ones.
    Deploy(DeployArgs),
}

#[derive(Args, Clone)]
pub struct DeployArgs {
    /// Source directory to read from
    #[arg(short, long)]
    pub source: PathBuf,

    /// S3 bucket to deploy to
    #[arg(short, long, env = "S3_BUCKET")]
    pub bucket: String,

    /// AWS access key ID
    #[arg(short, long, env = "AWS_ACCESS_KEY_ID", default_value = "", hide_env_values = true)]
    pub key: String,

    /// AWS secret access key
    #[arg(short = 'x', long, env = "AWS_SECRET_ACCESS_KEY", default_value = "", hide_env_values = true)]
    pub secret: String,

    /// AWS region
    #[arg(short, long, env = "AWS_REGION", default_value = DEFAULT_REGION)]
    pub region: String,

    /// Custom endpoint for S3-compatible stores
    #[arg(short, long, env = "AWS_ENDPOINT_URL_S3")]
    pub endpoint: Option<String>,

    /// Maximum number of uploads in flight at once
    #[arg(short = 'j', long, default_value_t = NonZeroUsize::MIN)]
    pub concurrency: NonZeroUsize,
}

///exit status for a failed parse. Only explicit `--help`/`--version` count as success.
pub fn parse_error_status(e: &clap::Error) -> u8 {
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => crate::EXIT_CONFIG_ERROR,
    }
}

/// Everything one deploy needs, fixed for the whole run.
#[derive(Clone)]
pub struct DeploymentRequest {
    pub source: PathBuf,
    pub bucket: String,
    pub key: String,
    pub secret: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub concurrency: NonZeroUsize,
}

impl Debug for DeploymentRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeploymentRequest")
            .field("source", &self.source)
            .field("bucket", &self.bucket)
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl DeploymentRequest {
    ///static credentials are only used when both halves are present
    pub fn static_credentials(&self) -> Option<(&str, &str)> {
        if self.key.is_empty() || self.secret.is_empty() {
            None
        } else {
            Some((&self.key, &self.secret))
        }
    }
}

impl TryFrom<DeployArgs> for DeploymentRequest {
    type Error = ConfigError;

    fn try_from(
        DeployArgs {
            source,
            bucket,
            key,
            secret,
            region,
            endpoint,
            concurrency,
        }: DeployArgs,
    ) -> Result<Self, Self::Error> {
        if source.as_os_str().is_empty() {
            return Err(ConfigError::MissingSource);
        }
        if bucket.is_empty() {
            return Err(ConfigError::MissingBucket);
        }

        Ok(Self {
            source,
            bucket,
            key,
            secret,
            region,
            endpoint: endpoint.filter(|x| !x.is_empty()),
            concurrency,
        })
    }
}
