/// File metadata model
///
/// A `File` row describes bytes already stored in the blob store. Rows are
/// only ever inserted by the upload pipeline, after the store confirmed the
/// write.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE files (
///     id UUID PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     mime_type VARCHAR(255) NOT NULL,
///     size BIGINT NOT NULL,
///     url VARCHAR(1024) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ
/// );
/// ```

use crate::repository::{postgres::PgEntity, Condition, Entity, EntityFilter};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{query_builder::Separated, Postgres};
use uuid::Uuid;

/// Stored asset metadata
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct File {
    pub id: Uuid,

    /// Logical file name (last segment of the storage key)
    pub name: String,

    pub mime_type: String,

    /// Size in bytes
    pub size: i64,

    /// Location returned by the blob store
    pub url: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl File {
    /// Builds metadata for bytes stored at `url`
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        size: i64,
        url: impl Into<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            mime_type: mime_type.into(),
            size,
            url: url.into(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Filter for [`File`] lookups
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileFilter {
    pub id: Option<Uuid>,
}

impl FileFilter {
    pub fn by_id(id: Uuid) -> Self {
        Self { id: Some(id) }
    }
}

impl EntityFilter<File> for FileFilter {
    fn conditions(&self) -> Vec<Condition> {
        self.id
            .map(|id| vec![Condition::uuid("id", id)])
            .unwrap_or_default()
    }

    fn matches(&self, file: &File) -> bool {
        self.id.map_or(true, |id| file.id == id)
    }
}

impl Entity for File {
    type Filter = FileFilter;

    const TABLE: &'static str = "files";

    fn id(&self) -> Uuid {
        self.id
    }

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
        self.updated_at = at;
    }
}

impl PgEntity for File {
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "mime_type",
        "size",
        "url",
        "created_at",
        "updated_at",
        "deleted_at",
    ];

    fn push_values(&self, values: &mut Separated<'_, '_, Postgres, &'static str>) {
        values
            .push_bind(self.name.clone())
            .push_bind(self.mime_type.clone())
            .push_bind(self.size)
            .push_bind(self.url.clone())
            .push_bind(self.created_at)
            .push_bind(self.updated_at)
            .push_bind(self.deleted_at);
    }
}
