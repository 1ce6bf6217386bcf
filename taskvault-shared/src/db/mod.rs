/// Postgres connection management
///
/// # Modules
///
/// - `pool`: sqlx pool creation, health check, statistics and shutdown
/// - `migrations`: embedded schema migrations
///
/// Repositories over the pool live in [`crate::repository::postgres`].

pub mod migrations;
pub mod pool;
