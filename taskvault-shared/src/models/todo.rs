/// Todo model
///
/// Todos always belong to exactly one user. The owner is fixed at creation
/// and every lookup is expected to filter on it, which is what keeps one
/// user's todos invisible to another.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE todo_status AS ENUM ('NotStarted', 'Done');
///
/// CREATE TABLE todos (
///     id UUID PRIMARY KEY,
///     user_id UUID NOT NULL REFERENCES users(id),
///     name VARCHAR(255) NOT NULL,
///     status todo_status NOT NULL DEFAULT 'NotStarted',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ
/// );
/// ```

use crate::repository::{postgres::PgEntity, Condition, Entity, EntityFilter};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{query_builder::Separated, Postgres};
use std::fmt;
use uuid::Uuid;

/// Todo progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "todo_status")]
pub enum TodoStatus {
    /// Freshly created
    NotStarted,

    /// Completed
    Done,
}

impl TodoStatus {
    /// Wire/database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TodoStatus::NotStarted => "NotStarted",
            TodoStatus::Done => "Done",
        }
    }

    /// Parses the wire representation
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "NotStarted" => Some(TodoStatus::NotStarted),
            "Done" => Some(TodoStatus::Done),
            _ => None,
        }
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task on a user's list
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Todo {
    pub id: Uuid,

    /// Owner; immutable after creation
    pub user_id: Uuid,

    pub name: String,

    pub status: TodoStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Todo {
    /// Builds a new todo for `user_id`; status always starts as `NotStarted`
    pub fn new(user_id: Uuid, name: impl Into<String>) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            user_id,
            name: name.into(),
            status: TodoStatus::NotStarted,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Filter for [`Todo`] lookups
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoFilter {
    pub id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

impl TodoFilter {
    /// Matches every todo owned by `user_id`
    pub fn owned_by(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            ..Default::default()
        }
    }

    /// Narrows the filter to a single todo id
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }
}

impl EntityFilter<Todo> for TodoFilter {
    fn conditions(&self) -> Vec<Condition> {
        let mut conditions = Vec::new();
        if let Some(id) = self.id {
            conditions.push(Condition::uuid("id", id));
        }
        if let Some(user_id) = self.user_id {
            conditions.push(Condition::uuid("user_id", user_id));
        }
        conditions
    }

    fn matches(&self, todo: &Todo) -> bool {
        self.id.map_or(true, |id| todo.id == id)
            && self.user_id.map_or(true, |user_id| todo.user_id == user_id)
    }
}

impl Entity for Todo {
    type Filter = TodoFilter;

    const TABLE: &'static str = "todos";

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

impl PgEntity for Todo {
    const COLUMNS: &'static [&'static str] = &[
        "user_id",
        "name",
        "status",
        "created_at",
        "updated_at",
        "deleted_at",
    ];

    fn push_values(&self, values: &mut Separated<'_, '_, Postgres, &'static str>) {
        values
            .push_bind(self.user_id)
            .push_bind(self.name.clone())
            .push_bind(self.status)
            .push_bind(self.created_at)
            .push_bind(self.updated_at)
            .push_bind(self.deleted_at);
    }
}
