/// Blob storage
///
/// Uploaded bytes live in an object store addressed by key. The upload
/// pipeline only ever needs one operation, [`BlobStore::put_object`], which
/// returns the public location of the stored object.
///
/// # Implementations
///
/// - [`s3::S3BlobStore`]: any S3-compatible endpoint via `aws-sdk-s3`
/// - [`memory::MemoryBlobStore`]: in-process map, used by tests and local runs

pub mod memory;
pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;

/// Error type for blob store operations
#[derive(Debug, thiserror::Error)]
pub enum BlobStoreError {
    /// The store rejected or failed the write
    #[error("Object upload failed: {0}")]
    Upload(String),

    /// Client could not be configured
    #[error("Invalid storage configuration: {0}")]
    InvalidConfig(String),
}

/// Object store abstraction
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `data` under `key` and returns its public URL
    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<String, BlobStoreError>;
}
