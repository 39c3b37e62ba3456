use crate::config::DeploymentRequest;
use s3::{creds::Credentials, error::S3Error, Bucket, Region};

/// The two calls a deploy makes against object storage.
#[allow(async_fn_in_trait)]
pub trait ObjectStore {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn bucket_names(&self) -> Result<Vec<String>, Self::Error>;

    ///returns the HTTP status code of the put
    async fn put_object(
        &self,
        key: &str,
        contents: &[u8],
        content_type: &str,
    ) -> Result<u16, Self::Error>;
}

pub struct S3Store {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
}

impl S3Store {
    pub fn new(request: &DeploymentRequest) -> color_eyre::Result<Self> {
        let credentials = get_aws_creds(request)?;
        let region = get_region(request)?;
        let bucket = Bucket::new(&request.bucket, region.clone(), credentials.clone())?;

        Ok(Self {
            bucket,
            region,
            credentials,
        })
    }
}

impl ObjectStore for S3Store {
    type Error = S3Error;

    async fn bucket_names(&self) -> Result<Vec<String>, S3Error> {
        let rsp = Bucket::list_buckets(self.region.clone(), self.credentials.clone()).await?;
        Ok(rsp.bucket_names().collect())
    }

    async fn put_object(
        &self,
        key: &str,
        contents: &[u8],
        content_type: &str,
    ) -> Result<u16, S3Error> {
        let rsp = self
            .bucket
            .put_object_with_content_type(key, contents, content_type)
            .await?;
        Ok(rsp.status_code())
    }
}

pub fn get_region(request: &DeploymentRequest) -> color_eyre::Result<Region> {
    Ok(match &request.endpoint {
        Some(endpoint) => Region::Custom {
            region: request.region.clone(),
            endpoint: endpoint.clone(),
        },
        None => request.region.parse()?,
    })
}

///falls back to the environment/profile chain when no static pair was given
pub fn get_aws_creds(request: &DeploymentRequest) -> color_eyre::Result<Credentials> {
    let creds = match request.static_credentials() {
        Some((access_key, secret_key)) => {
            Credentials::new(Some(access_key), Some(secret_key), None, None, None)?
        }
        None => {
            debug!("No static credentials provided, using default chain");
            Credentials::new(None, None, None, None, None)?
        }
    };

    Ok(creds)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DeployArgs, DEFAULT_REGION};
    use std::{num::NonZeroUsize, path::PathBuf};

    fn request(endpoint: Option<&str>) -> DeploymentRequest {
        DeploymentRequest::try_from(DeployArgs {
            source: PathBuf::from("site"),
            bucket: "test-bucket".to_owned(),
            key: "AKIA".to_owned(),
            secret: "shh".to_owned(),
            region: DEFAULT_REGION.to_owned(),
            endpoint: endpoint.map(str::to_owned),
            concurrency: NonZeroUsize::MIN,
        })
        .unwrap()
    }

    #[test]
    fn test_named_region() {
        let region = get_region(&request(None)).unwrap();
        assert_eq!(region, Region::EuWest1);
    }

    #[test]
    fn test_custom_endpoint_region() {
        let region = get_region(&request(Some("https://fly.storage.tigris.dev"))).unwrap();
        assert_eq!(
            region,
            Region::Custom {
                region: DEFAULT_REGION.to_owned(),
                endpoint: "https://fly.storage.tigris.dev".to_owned(),
            }
        );
    }

    #[test]
    fn test_static_creds() {
        let creds = get_aws_creds(&request(None)).unwrap();
        assert_eq!(creds.access_key.as_deref(), Some("AKIA"));
        assert_eq!(creds.secret_key.as_deref(), Some("shh"));
    }
}
