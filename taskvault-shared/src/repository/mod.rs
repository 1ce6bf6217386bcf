/// Soft-delete-aware persistence contract
///
/// Every entity (User, Todo, File) is stored through the same [`Repository`]
/// trait. Implementations apply the `deleted_at IS NULL` predicate themselves,
/// so callers only ever describe *which* rows they want through a typed
/// filter and can never forget to hide logically deleted rows.
///
/// # Implementations
///
/// - [`postgres::PgRepository`]: sqlx/Postgres, dynamic SQL via `QueryBuilder`
/// - [`memory::MemoryRepository`]: in-process `Vec` behind a tokio `RwLock`
///
/// # Example
///
/// ```
/// use taskvault_shared::models::todo::{Todo, TodoFilter};
/// use taskvault_shared::repository::{memory::MemoryRepository, Repository};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let repo = MemoryRepository::<Todo>::new();
/// let owner = Uuid::new_v4();
///
/// let todo = Todo::new(owner, "Buy milk");
/// repo.create(&todo).await?;
///
/// let filter = TodoFilter::owned_by(owner);
/// assert_eq!(repo.count(&filter).await?, 1);
///
/// repo.soft_delete(&todo).await?;
/// assert_eq!(repo.count(&filter).await?, 0);
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No active row with this id
    #[error("{table} row {id} not found")]
    NotFound { table: &'static str, id: Uuid },

    /// A row with this id already exists
    #[error("{table} row {id} already exists")]
    Duplicate { table: &'static str, id: Uuid },

    /// A write collided with a unique index other than the primary key
    #[error("{table} write violates unique constraint {constraint}")]
    UniqueViolation {
        table: &'static str,
        constraint: String,
    },
}

/// Repository result type alias
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// A persisted entity with an identity and a soft-delete marker
pub trait Entity: Clone + Send + Sync + 'static {
    /// Typed filter describing which rows of this entity to select
    type Filter: EntityFilter<Self>;

    /// Table (or collection) name
    const TABLE: &'static str;

    /// Identity, generated by the caller before `create`
    fn id(&self) -> Uuid;

    /// Soft-delete marker; `Some` rows are invisible to every query
    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    /// Sets the soft-delete marker
    fn mark_deleted(&mut self, at: DateTime<Utc>);

    /// Whether the row has been logically deleted
    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }
}

/// Value compared against a column in an equality condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// UUID column
    Uuid(Uuid),

    /// Text column
    Text(String),
}

/// Single `column = value` condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    /// Column name
    pub column: &'static str,

    /// Value the column must equal
    pub value: FilterValue,
}

impl Condition {
    /// Equality on a UUID column
    pub fn uuid(column: &'static str, value: Uuid) -> Self {
        Self {
            column,
            value: FilterValue::Uuid(value),
        }
    }

    /// Equality on a text column
    pub fn text(column: &'static str, value: impl Into<String>) -> Self {
        Self {
            column,
            value: FilterValue::Text(value.into()),
        }
    }
}

/// Caller-supplied filter for an entity
///
/// Filters never mention `deleted_at`; the repository ANDs it in.
pub trait EntityFilter<E>: fmt::Debug + Default + Clone + Send + Sync {
    /// Equality conditions, ANDed together (empty = all active rows)
    fn conditions(&self) -> Vec<Condition>;

    /// In-process evaluation of the same conditions
    fn matches(&self, entity: &E) -> bool;
}

/// Soft-delete-aware CRUD contract shared by every entity
///
/// All reads exclude soft-deleted rows. Results are returned in insertion
/// order (creation time, then id).
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Fetches one page of active rows matching `filter`
    ///
    /// An empty page is a normal result.
    async fn fetch_list(
        &self,
        offset: i64,
        limit: i64,
        filter: &E::Filter,
    ) -> RepositoryResult<Vec<E>>;

    /// Counts active rows matching `filter`
    async fn count(&self, filter: &E::Filter) -> RepositoryResult<i64>;

    /// Returns the first active row matching `filter`, or `None`
    async fn find_one(&self, filter: &E::Filter) -> RepositoryResult<Option<E>>;

    /// Inserts a new row
    async fn create(&self, entity: &E) -> RepositoryResult<()>;

    /// Overwrites the whole row with the same id (last write wins)
    async fn update(&self, entity: &E) -> RepositoryResult<()>;

    /// Sets the row's soft-delete marker to now
    async fn soft_delete(&self, entity: &E) -> RepositoryResult<()>;
}
