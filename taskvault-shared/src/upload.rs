/// Data-URI upload pipeline
///
/// Turns a `data:<mime>;base64,<payload>` string into a stored blob plus a
/// [`File`] metadata row:
///
/// 1. split on the first comma
/// 2. extract the MIME type from the metadata segment
/// 3. check it against the category whitelist
/// 4. base64-decode the payload
/// 5. enforce the size ceiling
/// 6. map the MIME type to an extension
/// 7. build the storage key `<prefix>/<year>/<Month>/<yyyymmdd>_<name>.<ext>`
/// 8. write the bytes to the blob store under the configured timeout
/// 9. create the `File` row
///
/// Nothing is written before step 8. The metadata row is only created once
/// the blob store confirmed the write; if that insert fails the blob stays
/// behind unreferenced and a warning is logged.

use crate::models::file::File;
use crate::repository::{Repository, RepositoryError};
use crate::storage::{BlobStore, BlobStoreError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default size ceiling: 10 MiB
pub const DEFAULT_MAX_SIZE: usize = 10 * 1024 * 1024;

/// Key prefix for profile photos
pub const PROFILE_PICTURE_PREFIX: &str = "profile_pictures";

/// Whitelist: (category, MIME type, extension)
const MEDIA_TYPES: &[(MediaCategory, &str, &str)] = &[
    (MediaCategory::Image, "image/jpeg", "jpg"),
    (MediaCategory::Image, "image/jpg", "jpg"),
    (MediaCategory::Image, "image/png", "png"),
    (MediaCategory::Image, "image/gif", "gif"),
    (MediaCategory::Image, "image/webp", "webp"),
    (MediaCategory::Document, "application/pdf", "pdf"),
];

/// Accepted upload kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCategory {
    Image,
    Document,
}

/// Whether `mime_type` is accepted for `category`
pub fn is_mime_allowed(mime_type: &str, category: MediaCategory) -> bool {
    MEDIA_TYPES
        .iter()
        .any(|(c, m, _)| *c == category && *m == mime_type)
}

/// Canonical extension for a whitelisted MIME type
pub fn extension_for(mime_type: &str) -> Option<&'static str> {
    MEDIA_TYPES
        .iter()
        .find(|(_, m, _)| *m == mime_type)
        .map(|(_, _, ext)| *ext)
}

/// Error type for the upload pipeline
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Not a `data:<mime>;base64,<payload>` string, or undecodable payload
    #[error("Malformed upload: {0}")]
    MalformedInput(String),

    /// MIME type outside the category whitelist
    #[error("Unsupported media type: {0}")]
    UnsupportedType(String),

    /// Decoded payload over the ceiling
    #[error("File too large: {size} bytes exceeds {max} bytes")]
    TooLarge { size: usize, max: usize },

    /// Blob store write failed
    #[error(transparent)]
    Storage(#[from] BlobStoreError),

    /// Blob store write did not finish in time
    #[error("Upload timed out after {0:?}")]
    Timeout(Duration),

    /// Metadata row could not be created
    #[error("Failed to record file metadata: {0}")]
    Metadata(#[from] RepositoryError),
}

/// Upload pipeline settings
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Size ceiling in bytes
    pub max_size: usize,

    /// Deadline for the blob store write
    pub timeout: Duration,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            timeout: Duration::from_secs(10),
        }
    }
}

/// A validated, decoded payload
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedUpload {
    pub mime_type: String,
    pub extension: &'static str,
    pub data: Bytes,
}

/// Runs steps 1-6: parse, whitelist, decode, size check, extension
pub fn decode_data_uri(
    input: &str,
    category: MediaCategory,
    max_size: usize,
) -> Result<DecodedUpload, UploadError> {
    let (meta, payload) = input
        .split_once(',')
        .ok_or_else(|| UploadError::MalformedInput("invalid base64 data".to_string()))?;

    let mime_type = meta.split(';').next().unwrap_or_default();
    let mime_type = mime_type.strip_prefix("data:").unwrap_or(mime_type);
    if mime_type.is_empty() {
        return Err(UploadError::MalformedInput(
            "unable to parse MIME type".to_string(),
        ));
    }

    if !is_mime_allowed(mime_type, category) {
        return Err(UploadError::UnsupportedType(mime_type.to_string()));
    }

    let data = STANDARD
        .decode(payload)
        .map_err(|e| UploadError::MalformedInput(e.to_string()))?;

    if data.len() > max_size {
        return Err(UploadError::TooLarge {
            size: data.len(),
            max: max_size,
        });
    }

    let extension = extension_for(mime_type)
        .ok_or_else(|| UploadError::UnsupportedType(mime_type.to_string()))?;

    Ok(DecodedUpload {
        mime_type: mime_type.to_string(),
        extension,
        data: Bytes::from(data),
    })
}

/// Replaces every character outside `[A-Za-z0-9_-]` with `_`
pub fn sanitize_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() {
        "file".to_string()
    } else {
        sanitized
    }
}

/// Builds `(file_name, key)` for an object stored at `now`
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use taskvault_shared::upload::storage_key;
///
/// let now = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
/// let (file_name, key) = storage_key("profile_pictures", now, "Alice Smith", "png");
///
/// assert_eq!(file_name, "20240305_Alice_Smith.png");
/// assert_eq!(key, "profile_pictures/2024/March/20240305_Alice_Smith.png");
/// ```
pub fn storage_key(
    prefix: &str,
    now: DateTime<Utc>,
    name: &str,
    extension: &str,
) -> (String, String) {
    let file_name = format!(
        "{}_{}.{}",
        now.format("%Y%m%d"),
        sanitize_name(name),
        extension
    );
    let key = format!("{}/{}/{}", prefix, now.format("%Y/%B"), file_name);

    (file_name, key)
}

/// Upload pipeline bound to a blob store and the file repository
#[derive(Clone)]
pub struct Uploader {
    blob_store: Arc<dyn BlobStore>,
    files: Arc<dyn Repository<File>>,
    config: UploadConfig,
}

impl Uploader {
    pub fn new(
        blob_store: Arc<dyn BlobStore>,
        files: Arc<dyn Repository<File>>,
        config: UploadConfig,
    ) -> Self {
        Self {
            blob_store,
            files,
            config,
        }
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Runs the full pipeline and returns the created metadata row
    pub async fn upload(
        &self,
        data_uri: &str,
        category: MediaCategory,
        prefix: &str,
        name: &str,
    ) -> Result<File, UploadError> {
        let decoded = decode_data_uri(data_uri, category, self.config.max_size)?;
        let (file_name, key) = storage_key(prefix, Utc::now(), name, decoded.extension);
        let size = decoded.data.len();

        debug!(key = %key, mime_type = %decoded.mime_type, size, "Uploading object");

        let url = tokio::time::timeout(
            self.config.timeout,
            self.blob_store
                .put_object(&key, decoded.data, &decoded.mime_type),
        )
        .await
        .map_err(|_| UploadError::Timeout(self.config.timeout))??;

        let file = File::new(file_name, decoded.mime_type, size as i64, url);

        if let Err(e) = self.files.create(&file).await {
            warn!(key = %key, url = %file.url, error = %e, "Blob stored but metadata insert failed; object is orphaned");
            return Err(e.into());
        }

        info!(file_id = %file.id, key = %key, "File uploaded");
        Ok(file)
    }
}
