use crate::{
    config::DeploymentRequest,
    error::ConfigError,
    prefix::build_prefix,
    store::ObjectStore,
    upload::{upload_all, upload_tasks, DeployReport},
};
use std::{io::ErrorKind, path::Path};

///`Ok(false)` only when nothing is there. Other stat failures come back as errors.
pub fn dir_exists(path: &Path) -> std::io::Result<bool> {
    match std::fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

pub fn check_source(source: &Path) -> Result<(), ConfigError> {
    match dir_exists(source) {
        Ok(true) => {}
        Ok(false) => return Err(ConfigError::SourceNotFound(source.to_path_buf())),
        Err(e) => {
            return Err(ConfigError::SourceUnreadable {
                path: source.to_path_buf(),
                source: e,
            })
        }
    }

    if !source.is_dir() {
        return Err(ConfigError::SourceNotDirectory(source.to_path_buf()));
    }

    Ok(())
}

#[instrument(skip(store))]
pub async fn ensure_bucket_exists<S: ObjectStore>(
    store: &S,
    bucket: &str,
) -> Result<(), ConfigError> {
    let names = store
        .bucket_names()
        .await
        .map_err(|e| ConfigError::BucketLookup {
            bucket: bucket.to_owned(),
            source: Box::new(e),
        })?;

    if names.iter().any(|name| name == bucket) {
        debug!("Found bucket");
        Ok(())
    } else {
        Err(ConfigError::BucketNotFound(bucket.to_owned()))
    }
}

/// Checks the source and bucket, then uploads every file under a fresh prefix.
///
/// Per-file failures don't abort the run; they end up in [`DeployReport::failed`].
#[instrument(skip(store))]
pub async fn deploy<S: ObjectStore>(
    request: &DeploymentRequest,
    store: &S,
) -> Result<DeployReport, ConfigError> {
    check_source(&request.source)?;
    upload_to_bucket(request, store).await
}

///like [`deploy`], but only builds the store once the source has been checked
#[instrument(skip(connect))]
pub async fn deploy_with<S, F>(
    request: &DeploymentRequest,
    connect: F,
) -> Result<DeployReport, ConfigError>
where
    S: ObjectStore,
    F: FnOnce(&DeploymentRequest) -> color_eyre::Result<S>,
{
    check_source(&request.source)?;
    let store = connect(request).map_err(|e| ConfigError::StoreSetup(e.into()))?;
    upload_to_bucket(request, &store).await
}

async fn upload_to_bucket<S: ObjectStore>(
    request: &DeploymentRequest,
    store: &S,
) -> Result<DeployReport, ConfigError> {
    ensure_bucket_exists(store, &request.bucket).await?;

    let prefix = build_prefix();
    info!(%prefix, "Uploading files");

    let tasks = upload_tasks(&request.source, &prefix);
    Ok(upload_all(store, &prefix, tasks, request.concurrency).await)
}
