/// User model
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY,
///     avatar_id UUID REFERENCES files(id) ON DELETE SET NULL,
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ
/// );
///
/// CREATE UNIQUE INDEX users_email_active_key ON users (email) WHERE deleted_at IS NULL;
/// ```
///
/// Email uniqueness only holds among active (non-deleted) users.

use crate::models::file::File;
use crate::repository::{postgres::PgEntity, Condition, Entity, EntityFilter};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{query_builder::Separated, Postgres};
use uuid::Uuid;

/// Partial unique index keeping active emails distinct
pub const EMAIL_UNIQUE_INDEX: &str = "users_email_active_key";

/// User account
///
/// The password hash is never serialized, so a `User` can be returned to
/// clients as-is.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Current profile photo
    pub avatar_id: Option<Uuid>,

    /// Display name
    pub name: String,

    /// Email address, unique among active users
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Builds a new active user with a fresh id
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            avatar_id: None,
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// User together with its avatar file, as shown on the profile
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<File>,
}

/// Filter for [`User`] lookups
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    pub id: Option<Uuid>,
    pub email: Option<String>,
}

impl UserFilter {
    /// Matches the user with this id
    pub fn by_id(id: Uuid) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    /// Matches the user with this email
    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Default::default()
        }
    }
}

impl EntityFilter<User> for UserFilter {
    fn conditions(&self) -> Vec<Condition> {
        let mut conditions = Vec::new();
        if let Some(id) = self.id {
            conditions.push(Condition::uuid("id", id));
        }
        if let Some(ref email) = self.email {
            conditions.push(Condition::text("email", email.clone()));
        }
        conditions
    }

    fn matches(&self, user: &User) -> bool {
        self.id.map_or(true, |id| user.id == id)
            && self.email.as_ref().map_or(true, |email| &user.email == email)
    }
}

impl Entity for User {
    type Filter = UserFilter;

    const TABLE: &'static str = "users";

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

impl PgEntity for User {
    const COLUMNS: &'static [&'static str] = &[
        "avatar_id",
        "name",
        "email",
        "password_hash",
        "created_at",
        "updated_at",
        "deleted_at",
    ];

    fn push_values(&self, values: &mut Separated<'_, '_, Postgres, &'static str>) {
        values
            .push_bind(self.avatar_id)
            .push_bind(self.name.clone())
            .push_bind(self.email.clone())
            .push_bind(self.password_hash.clone())
            .push_bind(self.created_at)
            .push_bind(self.updated_at)
            .push_bind(self.deleted_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_is_active() {
        let user = User::new("Alice", "a@x.com", "$argon2id$hash");

        assert_eq!(user.name, "Alice");
        assert!(user.avatar_id.is_none());
        assert!(!user.is_deleted());
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let user = User::new("Alice", "a@x.com", "$argon2id$secret-hash");
        let json = serde_json::to_value(&user).unwrap();

        assert!(json.get("password_hash").is_none());
        assert!(json.get("deleted_at").is_none());
        assert_eq!(json["email"], "a@x.com");
        assert!(!json.to_string().contains("secret-hash"));
    }

    #[test]
    fn test_filter_matches() {
        let user = User::new("Alice", "a@x.com", "hash");

        assert!(UserFilter::default().matches(&user));
        assert!(UserFilter::by_id(user.id).matches(&user));
        assert!(UserFilter::by_email("a@x.com").matches(&user));
        assert!(!UserFilter::by_email("b@x.com").matches(&user));
        assert!(!UserFilter::by_id(Uuid::new_v4()).matches(&user));
    }

    #[test]
    fn test_filter_conditions() {
        let id = Uuid::new_v4();
        let filter = UserFilter {
            id: Some(id),
            email: Some("a@x.com".to_string()),
        };

        assert_eq!(
            filter.conditions(),
            vec![Condition::uuid("id", id), Condition::text("email", "a@x.com")]
        );
        assert!(UserFilter::default().conditions().is_empty());
    }

    #[test]
    fn test_column_count_matches_bound_values() {
        assert_eq!(User::COLUMNS.len(), 7);
    }
}
