/// Persisted entities
///
/// Each model implements [`crate::repository::Entity`] (identity + soft-delete
/// marker) and [`crate::repository::postgres::PgEntity`] (table mapping), and
/// ships a typed filter used by the generic repository.
///
/// # Models
///
/// - `user`: accounts, with an optional avatar file
/// - `todo`: per-user task list entries
/// - `file`: metadata for uploaded blobs

pub mod file;
pub mod todo;
pub mod user;
