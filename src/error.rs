use std::{io, path::PathBuf};
use thiserror::Error;

/// Everything that stops a deploy before the first upload.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("source directory must be provided")]
    MissingSource,
    #[error("bucket name must be provided")]
    MissingBucket,
    #[error("source directory {0:?} does not exist")]
    SourceNotFound(PathBuf),
    #[error("source path {0:?} is not a directory")]
    SourceNotDirectory(PathBuf),
    #[error("unable to check source directory {path:?}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to set up the S3 client")]
    StoreSetup(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("destination bucket {0:?} does not exist")]
    BucketNotFound(String),
    #[error("unable to list buckets while looking for {bucket:?}")]
    BucketLookup {
        bucket: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
