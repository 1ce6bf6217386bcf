/// Postgres repository built on sqlx
///
/// One generic implementation serves every entity. Entities describe their
/// table and columns through [`PgEntity`]; filters contribute equality
/// conditions which are bound as parameters, never interpolated.
///
/// # Generated SQL
///
/// ```text
/// SELECT id, <cols> FROM <table> WHERE deleted_at IS NULL [AND c = $n ...]
///     ORDER BY created_at ASC, id ASC LIMIT $n OFFSET $n
/// SELECT COUNT(*) FROM <table> WHERE deleted_at IS NULL [AND ...]
/// INSERT INTO <table> (id, <cols>) VALUES ($1, ...)
/// UPDATE <table> SET (<cols>) = ROW($1, ...) WHERE id = $n
/// UPDATE <table> SET deleted_at = $1, updated_at = $1 WHERE id = $2 AND deleted_at IS NULL
/// ```

use super::{
    Entity, EntityFilter, FilterValue, Repository, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{
    postgres::{PgPool, PgRow},
    query_builder::Separated,
    FromRow, Postgres, QueryBuilder,
};
use std::marker::PhantomData;
use tracing::{debug, error};

/// Table mapping for an entity stored in Postgres
pub trait PgEntity: Entity + for<'r> FromRow<'r, PgRow> + Unpin {
    /// Columns other than `id`, in the order [`PgEntity::push_values`] binds them
    const COLUMNS: &'static [&'static str];

    /// Binds one value per entry of [`PgEntity::COLUMNS`]
    fn push_values(&self, values: &mut Separated<'_, '_, Postgres, &'static str>);
}

/// SQLSTATE for `unique_violation`
const UNIQUE_VIOLATION: &str = "23505";

/// Maps a failed INSERT/UPDATE, singling out unique-index collisions
fn write_error(table: &'static str, err: sqlx::Error) -> RepositoryError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            debug!(table, constraint = %constraint, "Unique constraint violated");
            return RepositoryError::UniqueViolation { table, constraint };
        }
    }

    RepositoryError::Database(err)
}

/// Generic sqlx repository
pub struct PgRepository<E> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for PgRepository<E> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: PgEntity> PgRepository<E> {
    /// Creates a repository over `pool`
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    fn select_clause() -> String {
        format!("SELECT id, {} FROM {}", E::COLUMNS.join(", "), E::TABLE)
    }
}

/// Appends the implicit soft-delete predicate and the filter's conditions
pub fn push_filter<E: Entity>(query: &mut QueryBuilder<'_, Postgres>, filter: &E::Filter) {
    query.push(" WHERE deleted_at IS NULL");

    for condition in filter.conditions() {
        query.push(" AND ").push(condition.column).push(" = ");
        match condition.value {
            FilterValue::Uuid(value) => {
                query.push_bind(value);
            }
            FilterValue::Text(value) => {
                query.push_bind(value);
            }
        }
    }
}

#[async_trait]
impl<E: PgEntity> Repository<E> for PgRepository<E> {
    async fn fetch_list(
        &self,
        offset: i64,
        limit: i64,
        filter: &E::Filter,
    ) -> RepositoryResult<Vec<E>> {
        let mut query = QueryBuilder::<Postgres>::new(Self::select_clause());
        push_filter::<E>(&mut query, filter);
        query
            .push(" ORDER BY created_at ASC, id ASC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = query
            .build_query_as::<E>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!(table = E::TABLE, error = %e, "Failed to fetch rows");
                e
            })?;

        Ok(rows)
    }

    async fn count(&self, filter: &E::Filter) -> RepositoryResult<i64> {
        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {}", E::TABLE));
        push_filter::<E>(&mut query, filter);

        let count = query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn find_one(&self, filter: &E::Filter) -> RepositoryResult<Option<E>> {
        let mut query = QueryBuilder::<Postgres>::new(Self::select_clause());
        push_filter::<E>(&mut query, filter);
        query.push(" ORDER BY created_at ASC, id ASC LIMIT 1");

        let row = query
            .build_query_as::<E>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn create(&self, entity: &E) -> RepositoryResult<()> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "INSERT INTO {} (id, {}) VALUES (",
            E::TABLE,
            E::COLUMNS.join(", ")
        ));

        let mut values = query.separated(", ");
        values.push_bind(entity.id());
        entity.push_values(&mut values);
        values.push_unseparated(")");

        query
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| write_error(E::TABLE, e))?;

        debug!(table = E::TABLE, id = %entity.id(), "Row created");
        Ok(())
    }

    async fn update(&self, entity: &E) -> RepositoryResult<()> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "UPDATE {} SET ({}) = ROW(",
            E::TABLE,
            E::COLUMNS.join(", ")
        ));

        let mut values = query.separated(", ");
        entity.push_values(&mut values);
        values.push_unseparated(")");

        query.push(" WHERE id = ").push_bind(entity.id());

        let result = query
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| write_error(E::TABLE, e))?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound {
                table: E::TABLE,
                id: entity.id(),
            });
        }

        debug!(table = E::TABLE, id = %entity.id(), "Row updated");
        Ok(())
    }

    async fn soft_delete(&self, entity: &E) -> RepositoryResult<()> {
        let sql = format!(
            "UPDATE {} SET deleted_at = $1, updated_at = $1 WHERE id = $2 AND deleted_at IS NULL",
            E::TABLE
        );

        let result = sqlx::query(&sql)
            .bind(Utc::now())
            .bind(entity.id())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound {
                table: E::TABLE,
                id: entity.id(),
            });
        }

        debug!(table = E::TABLE, id = %entity.id(), "Row soft-deleted");
        Ok(())
    }
}
