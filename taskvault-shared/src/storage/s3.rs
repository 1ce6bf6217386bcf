/// S3-compatible blob store
///
/// Objects are written with a `public-read` ACL and addressed path-style, so
/// the returned URL is always `<endpoint>/<bucket>/<key>`. This works the same
/// against AWS, MinIO and other S3-compatible services.

use super::{BlobStore, BlobStoreError};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{Credentials, Region},
    primitives::ByteStream,
    types::ObjectCannedAcl,
    Client,
};
use bytes::Bytes;
use tracing::{error, info};

/// Connection settings for an S3-compatible endpoint
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Base URL, e.g. `https://s3.eu-central-1.amazonaws.com` or `http://localhost:9000`
    pub endpoint: String,

    pub region: String,

    pub bucket: String,

    pub access_key: String,

    pub secret_key: String,
}

/// Blob store backed by `aws-sdk-s3`
#[derive(Debug, Clone)]
pub struct S3BlobStore {
    client: Client,
    endpoint: String,
    bucket: String,
}

impl S3BlobStore {
    /// Builds a client from static credentials
    pub async fn new(config: S3Config) -> Result<Self, BlobStoreError> {
        if config.bucket.is_empty() {
            return Err(BlobStoreError::InvalidConfig(
                "S3 bucket name not configured".to_string(),
            ));
        }

        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "static",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(&config.endpoint)
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        info!(endpoint = %config.endpoint, bucket = %config.bucket, "S3 blob store configured");

        Ok(Self {
            client: Client::from_conf(s3_config),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            bucket: config.bucket,
        })
    }

    /// Public URL of `key`
    pub fn object_url(&self, key: &str) -> String {
        object_url(&self.endpoint, &self.bucket, key)
    }
}

fn object_url(endpoint: &str, bucket: &str, key: &str) -> String {
    format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key)
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<String, BlobStoreError> {
        let size = data.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, key = %key, "Failed to upload object to S3");
                BlobStoreError::Upload(e.to_string())
            })?;

        info!(key = %key, bucket = %self.bucket, size, "Object uploaded to S3");
        Ok(self.object_url(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url_is_path_style() {
        assert_eq!(
            object_url("http://localhost:9000", "avatars", "profile_pictures/2024/March/a.png"),
            "http://localhost:9000/avatars/profile_pictures/2024/March/a.png"
        );
    }

    #[test]
    fn test_object_url_trims_trailing_slash() {
        assert_eq!(object_url("http://minio/", "b", "k"), "http://minio/b/k");
    }
}
