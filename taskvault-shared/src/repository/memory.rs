/// In-memory repository
///
/// Rows live in a `Vec` in insertion order behind a tokio `RwLock`. Soft
/// deletes only set the marker, so deleted rows stay in the vector and can be
/// inspected with [`MemoryRepository::rows`].

use super::{Entity, EntityFilter, Repository, RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

/// `Vec`-backed repository for any [`Entity`]
#[derive(Debug)]
pub struct MemoryRepository<E> {
    rows: RwLock<Vec<E>>,
}

impl<E: Entity> Default for MemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> MemoryRepository<E> {
    /// Creates an empty repository
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    /// Every physically stored row, deleted ones included
    pub async fn rows(&self) -> Vec<E> {
        self.rows.read().await.clone()
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for MemoryRepository<E> {
    async fn fetch_list(
        &self,
        offset: i64,
        limit: i64,
        filter: &E::Filter,
    ) -> RepositoryResult<Vec<E>> {
        let rows = self.rows.read().await;

        Ok(rows
            .iter()
            .filter(|row| !row.is_deleted() && filter.matches(row))
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &E::Filter) -> RepositoryResult<i64> {
        let rows = self.rows.read().await;

        Ok(rows
            .iter()
            .filter(|row| !row.is_deleted() && filter.matches(row))
            .count() as i64)
    }

    async fn find_one(&self, filter: &E::Filter) -> RepositoryResult<Option<E>> {
        let rows = self.rows.read().await;

        Ok(rows
            .iter()
            .find(|row| !row.is_deleted() && filter.matches(row))
            .cloned())
    }

    async fn create(&self, entity: &E) -> RepositoryResult<()> {
        let mut rows = self.rows.write().await;

        if rows.iter().any(|row| row.id() == entity.id()) {
            return Err(RepositoryError::Duplicate {
                table: E::TABLE,
                id: entity.id(),
            });
        }

        rows.push(entity.clone());
        Ok(())
    }

    async fn update(&self, entity: &E) -> RepositoryResult<()> {
        let mut rows = self.rows.write().await;

        let row = rows
            .iter_mut()
            .find(|row| row.id() == entity.id())
            .ok_or(RepositoryError::NotFound {
                table: E::TABLE,
                id: entity.id(),
            })?;

        *row = entity.clone();
        Ok(())
    }

    async fn soft_delete(&self, entity: &E) -> RepositoryResult<()> {
        let mut rows = self.rows.write().await;

        let row = rows
            .iter_mut()
            .find(|row| row.id() == entity.id() && !row.is_deleted())
            .ok_or(RepositoryError::NotFound {
                table: E::TABLE,
                id: entity.id(),
            })?;

        row.mark_deleted(Utc::now());
        Ok(())
    }
}
