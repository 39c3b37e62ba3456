use crate::store::ObjectStore;
use comfy_table::{presets::UTF8_FULL, Table};
use futures::{stream, StreamExt};
use std::{
    fmt::{Display, Formatter},
    num::NonZeroUsize,
    path::{Component, Path, PathBuf},
};
use tokio::{fs::File, io::AsyncReadExt};
use walkdir::WalkDir;

/// One regular file found during the walk, and where it should end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTask {
    pub path: PathBuf,
    pub key: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FailureStage {
    Walk,
    Key,
    Open,
    Upload,
}

impl Display for FailureStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureStage::Walk => write!(f, "walk"),
            FailureStage::Key => write!(f, "key"),
            FailureStage::Open => write!(f, "open"),
            FailureStage::Upload => write!(f, "upload"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUpload {
    pub path: PathBuf,
    pub stage: FailureStage,
    pub reason: String,
}

impl FailedUpload {
    fn new(path: PathBuf, stage: FailureStage, reason: impl Display) -> Self {
        Self {
            path,
            stage,
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeployReport {
    pub prefix: String,
    ///keys that made it into the bucket
    pub uploaded: Vec<String>,
    pub failed: Vec<FailedUpload>,
}

impl DeployReport {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn summary(&self) -> String {
        format!("Uploaded site with prefix: {}", self.prefix)
    }

    pub fn exit_status(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            crate::EXIT_PARTIAL_FAILURE
        }
    }

    pub fn failure_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["Path", "Stage", "Reason"]);
        for FailedUpload {
            path,
            stage,
            reason,
        } in &self.failed
        {
            table.add_row(vec![
                path.display().to_string(),
                stage.to_string(),
                reason.clone(),
            ]);
        }
        table
    }
}

///`{prefix}/{path relative to source}`, always `/`-separated
///
///`None` if `path` isn't under `source` or isn't valid UTF-8.
pub fn object_key(prefix: &str, source: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(source).ok()?;

    let mut key = prefix.to_owned();
    for component in relative.components() {
        let Component::Normal(part) = component else {
            continue;
        };
        key.push('/');
        key.push_str(part.to_str()?);
    }

    Some(key)
}

///every file or symlink under `source` that isn't a directory, lazily, in the order the filesystem hands them out
pub fn upload_tasks<'a>(
    source: &'a Path,
    prefix: &'a str,
) -> impl Iterator<Item = Result<UploadTask, FailedUpload>> + 'a {
    WalkDir::new(source).into_iter().filter_map(move |entry| {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(source).to_path_buf();
                warn!(?path, ?e, "Unable to walk entry");
                println!("Unable to read {}", path.display());
                return Some(Err(FailedUpload::new(path, FailureStage::Walk, e)));
            }
        };

        let path = entry.path();
        let file_type = entry.file_type();
        if file_type.is_dir() || (file_type.is_symlink() && path.is_dir()) {
            trace!(?path, "Skipping directory");
            return None;
        }
        //dangling links still go through, so they fail loudly on open
        if !file_type.is_file() && !file_type.is_symlink() {
            warn!(?path, ?file_type, "Skipping special file");
            println!("Skipping {}", path.display());
            return None;
        }

        Some(match object_key(prefix, source, path) {
            Some(key) => Ok(UploadTask {
                path: path.to_path_buf(),
                key,
            }),
            None => {
                error!(?path, "unable to get string repr of path");
                println!("Unable to name {}", path.display());
                Err(FailedUpload::new(
                    path.to_path_buf(),
                    FailureStage::Key,
                    "path is not valid UTF-8",
                ))
            }
        })
    })
}

async fn read_file(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut file = File::open(path).await?;
    let mut contents = vec![];
    file.read_to_end(&mut contents).await?;
    Ok(contents)
}

#[instrument(skip(store, task), fields(path = ?task.path))]
async fn upload_file<S: ObjectStore>(
    store: &S,
    task: UploadTask,
) -> Result<String, FailedUpload> {
    let UploadTask { path, key } = task;
    let contents = match read_file(&path).await {
        Ok(contents) => contents,
        Err(e) => {
            warn!(?e, "Unable to open file");
            println!("Unable to open {}", path.display());
            return Err(FailedUpload::new(path, FailureStage::Open, e));
        }
    };

    let content_type = new_mime_guess::from_path(&path).first_or_octet_stream();
    trace!(len = contents.len(), ?content_type, "Read file");

    match store
        .put_object(&key, &contents, content_type.essence_str())
        .await
    {
        Ok(code) if (200..300).contains(&code) => {
            info!(%code, "Uploaded to S3");
            println!("Uploaded {}", path.display());
            Ok(key)
        }
        Ok(code) => {
            warn!(%code, "Unexpected status from S3");
            println!("Failed to upload {}", path.display());
            Err(FailedUpload::new(
                path,
                FailureStage::Upload,
                format!("unexpected status code {code}"),
            ))
        }
        Err(e) => {
            warn!(?e, "Error uploading to S3");
            println!("Failed to upload {}", path.display());
            Err(FailedUpload::new(path, FailureStage::Upload, e))
        }
    }
}

///puts every task, at most `concurrency` at a time, never stopping early
pub async fn upload_all<S: ObjectStore>(
    store: &S,
    prefix: &str,
    tasks: impl Iterator<Item = Result<UploadTask, FailedUpload>>,
    concurrency: NonZeroUsize,
) -> DeployReport {
    let mut report = DeployReport::new(prefix);

    let mut results = std::pin::pin!(stream::iter(tasks)
        .map(move |task| async move {
            match task {
                Ok(task) => upload_file(store, task).await,
                Err(failed) => Err(failed),
            }
        })
        .buffer_unordered(concurrency.get()));

    while let Some(res) = results.next().await {
        match res {
            Ok(key) => report.uploaded.push(key),
            Err(failed) => report.failed.push(failed),
        }
    }

    info!(
        uploaded = report.uploaded.len(),
        failed = report.failed.len(),
        "Finished uploading"
    );

    report
}
