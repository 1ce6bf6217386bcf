/// Upload pipeline against the in-memory blob store and file repository

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;
use std::time::Duration;
use taskvault_shared::models::file::{File, FileFilter};
use taskvault_shared::repository::{
    memory::MemoryRepository, Repository, RepositoryError, RepositoryResult,
};
use taskvault_shared::storage::memory::MemoryBlobStore;
use taskvault_shared::upload::{
    MediaCategory, UploadConfig, UploadError, Uploader, DEFAULT_MAX_SIZE, PROFILE_PICTURE_PREFIX,
};
use uuid::Uuid;

/// 1x1 transparent PNG
const PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

struct Fixture {
    store: Arc<MemoryBlobStore>,
    files: Arc<MemoryRepository<File>>,
    uploader: Uploader,
}

fn fixture_with(store: MemoryBlobStore) -> Fixture {
    let store = Arc::new(store);
    let files = Arc::new(MemoryRepository::<File>::new());
    let uploader = Uploader::new(store.clone(), files.clone(), UploadConfig::default());

    Fixture {
        store,
        files,
        uploader,
    }
}

fn fixture() -> Fixture {
    fixture_with(MemoryBlobStore::new())
}

/// File repository whose inserts always fail
struct BrokenFiles;

#[async_trait]
impl Repository<File> for BrokenFiles {
    async fn fetch_list(&self, _: i64, _: i64, _: &FileFilter) -> RepositoryResult<Vec<File>> {
        Ok(Vec::new())
    }

    async fn count(&self, _: &FileFilter) -> RepositoryResult<i64> {
        Ok(0)
    }

    async fn find_one(&self, _: &FileFilter) -> RepositoryResult<Option<File>> {
        Ok(None)
    }

    async fn create(&self, file: &File) -> RepositoryResult<()> {
        Err(RepositoryError::Duplicate {
            table: "files",
            id: file.id,
        })
    }

    async fn update(&self, file: &File) -> RepositoryResult<()> {
        Err(RepositoryError::NotFound {
            table: "files",
            id: file.id,
        })
    }

    async fn soft_delete(&self, file: &File) -> RepositoryResult<()> {
        Err(RepositoryError::NotFound {
            table: "files",
            id: file.id,
        })
    }
}

async fn assert_nothing_written(f: &Fixture) {
    assert!(f.store.keys().await.is_empty());
    assert!(f.files.rows().await.is_empty());
}

#[tokio::test]
async fn test_png_upload_creates_file_matching_store_location() {
    let f = fixture();
    let input = format!("data:image/png;base64,{}", PNG_BASE64);

    let file = f
        .uploader
        .upload(&input, MediaCategory::Image, PROFILE_PICTURE_PREFIX, "Alice Smith")
        .await
        .unwrap();

    let keys = f.store.keys().await;
    assert_eq!(keys.len(), 1);
    let key = &keys[0];
    assert!(key.starts_with("profile_pictures/"));
    assert!(key.ends_with("_Alice_Smith.png"));

    assert_eq!(file.url, format!("memory://{}", key));
    assert_eq!(file.mime_type, "image/png");
    assert_eq!(file.size, STANDARD.decode(PNG_BASE64).unwrap().len() as i64);
    assert!(key.ends_with(&file.name));

    let stored = f.store.get(key).await.unwrap();
    assert_eq!(stored.content_type, "image/png");
    assert_eq!(stored.data.len() as i64, file.size);

    let rows = f.files.rows().await;
    assert_eq!(rows, vec![file]);
}

#[tokio::test]
async fn test_payload_without_comma_is_malformed() {
    let f = fixture();

    let result = f
        .uploader
        .upload("data:image/png;base64", MediaCategory::Image, PROFILE_PICTURE_PREFIX, "a")
        .await;

    assert!(matches!(result, Err(UploadError::MalformedInput(_))));
    assert_nothing_written(&f).await;
}

#[tokio::test]
async fn test_zip_is_unsupported() {
    let f = fixture();
    let input = format!("data:application/zip;base64,{}", STANDARD.encode(b"PK\x03\x04"));

    let result = f
        .uploader
        .upload(&input, MediaCategory::Image, PROFILE_PICTURE_PREFIX, "a")
        .await;

    assert!(matches!(result, Err(UploadError::UnsupportedType(_))));
    assert_nothing_written(&f).await;
}

#[tokio::test]
async fn test_one_byte_over_ceiling_is_too_large() {
    let f = fixture();
    let data = vec![0u8; DEFAULT_MAX_SIZE + 1];
    let input = format!("data:image/png;base64,{}", STANDARD.encode(&data));

    let result = f
        .uploader
        .upload(&input, MediaCategory::Image, PROFILE_PICTURE_PREFIX, "a")
        .await;

    assert!(matches!(
        result,
        Err(UploadError::TooLarge { size, max }) if size == DEFAULT_MAX_SIZE + 1 && max == DEFAULT_MAX_SIZE
    ));
    assert_nothing_written(&f).await;
}

#[tokio::test]
async fn test_store_failure_creates_no_metadata() {
    let f = fixture_with(MemoryBlobStore::failing());
    let input = format!("data:image/png;base64,{}", PNG_BASE64);

    let result = f
        .uploader
        .upload(&input, MediaCategory::Image, PROFILE_PICTURE_PREFIX, "a")
        .await;

    assert!(matches!(result, Err(UploadError::Storage(_))));
    assert!(f.files.rows().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_slow_store_times_out_without_metadata() {
    let f = fixture_with(MemoryBlobStore::with_delay(Duration::from_secs(60)));
    let input = format!("data:image/png;base64,{}", PNG_BASE64);

    let result = f
        .uploader
        .upload(&input, MediaCategory::Image, PROFILE_PICTURE_PREFIX, "a")
        .await;

    assert!(matches!(result, Err(UploadError::Timeout(_))));
    assert_nothing_written(&f).await;
}

#[tokio::test]
async fn test_metadata_failure_leaves_orphaned_blob() {
    let store = Arc::new(MemoryBlobStore::new());
    let uploader = Uploader::new(store.clone(), Arc::new(BrokenFiles), UploadConfig::default());
    let input = format!("data:image/png;base64,{}", PNG_BASE64);

    let result = uploader
        .upload(&input, MediaCategory::Image, PROFILE_PICTURE_PREFIX, "a")
        .await;

    assert!(matches!(result, Err(UploadError::Metadata(_))));
    assert_eq!(store.keys().await.len(), 1);
}

#[tokio::test]
async fn test_document_category_accepts_pdf_only() {
    let f = fixture();
    let pdf = format!("data:application/pdf;base64,{}", STANDARD.encode(b"%PDF-1.4"));
    let png = format!("data:image/png;base64,{}", PNG_BASE64);

    let file = f
        .uploader
        .upload(&pdf, MediaCategory::Document, "documents", &Uuid::new_v4().to_string())
        .await
        .unwrap();
    assert!(file.name.ends_with(".pdf"));

    let result = f.uploader.upload(&png, MediaCategory::Document, "documents", "x").await;
    assert!(matches!(result, Err(UploadError::UnsupportedType(_))));
}
