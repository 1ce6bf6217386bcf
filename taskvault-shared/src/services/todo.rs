/// Per-user todo CRUD
///
/// Every lookup filters on both the todo id and the caller's user id, so a
/// todo owned by someone else is indistinguishable from one that does not
/// exist.

use super::{with_deadline, BusinessRule, ServiceError, ServiceResult};
use crate::auth::jwt::SessionClaim;
use crate::models::todo::{Todo, TodoFilter, TodoStatus};
use crate::pagination::{Page, PageQuery};
use crate::repository::Repository;
use crate::response::{PageMeta, PaginatedResponse, Response};
use crate::validation::{validate_payload, validate_todo_status};
use axum::http::StatusCode;
use chrono::Utc;
use serde::Deserialize;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info, instrument};
use uuid::Uuid;
use validator::Validate;

/// Create payload
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateTodoRequest {
    #[validate(length(min = 1, code = "required"))]
    pub name: String,
}

/// Update payload; both fields are overwritten
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateTodoRequest {
    #[validate(length(min = 1, code = "required"))]
    pub name: String,

    #[validate(
        length(min = 1, code = "required"),
        custom(function = "validate_todo_status")
    )]
    pub status: String,
}

/// Todo orchestrator
#[derive(Clone)]
pub struct TodoService {
    todos: Arc<dyn Repository<Todo>>,
    timeout: Duration,
}

impl TodoService {
    pub fn new(todos: Arc<dyn Repository<Todo>>, timeout: Duration) -> Self {
        Self { todos, timeout }
    }

    /// Lists the caller's todos, one page at a time
    #[instrument(skip(self, claim), fields(user_id = %claim.user_id))]
    pub async fn list(
        &self,
        claim: &SessionClaim,
        query: &PageQuery,
    ) -> ServiceResult<PaginatedResponse<Todo>> {
        let page = Page::from(query);

        with_deadline(self.timeout, async {
            let filter = TodoFilter::owned_by(claim.user_id);

            let total = self.todos.count(&filter).await?;
            let meta = PageMeta {
                page: page.page,
                limit: page.limit,
                total,
            };

            if total == 0 {
                return Ok(PaginatedResponse::ok(Vec::new(), meta));
            }

            let todos = self
                .todos
                .fetch_list(page.offset, page.limit, &filter)
                .await?;

            debug!(total, returned = todos.len(), "Todos listed");
            Ok(PaginatedResponse::ok(todos, meta))
        })
        .await
    }

    /// Returns one of the caller's todos
    #[instrument(skip(self, claim), fields(user_id = %claim.user_id))]
    pub async fn get_one(&self, claim: &SessionClaim, todo_id: &str) -> ServiceResult<Response<Todo>> {
        with_deadline(self.timeout, async {
            let todo = self.find_owned(claim, todo_id).await?;
            Ok(Response::ok("success", todo))
        })
        .await
    }

    /// Creates a todo; status always starts as `NotStarted`
    #[instrument(skip(self, claim, payload), fields(user_id = %claim.user_id))]
    pub async fn create(
        &self,
        claim: &SessionClaim,
        payload: CreateTodoRequest,
    ) -> ServiceResult<Response<Todo>> {
        with_deadline(self.timeout, async {
            validate_payload(&payload).map_err(ServiceError::Validation)?;

            let todo = Todo::new(claim.user_id, payload.name);
            self.todos.create(&todo).await?;

            info!(todo_id = %todo.id, "Todo created");
            Ok(Response::created("success", todo))
        })
        .await
    }

    /// Overwrites name and status of one of the caller's todos
    ///
    /// Ownership is checked before the payload is validated.
    #[instrument(skip(self, claim, payload), fields(user_id = %claim.user_id))]
    pub async fn update(
        &self,
        claim: &SessionClaim,
        todo_id: &str,
        payload: UpdateTodoRequest,
    ) -> ServiceResult<Response<Todo>> {
        with_deadline(self.timeout, async {
            let mut todo = self.find_owned(claim, todo_id).await?;

            validate_payload(&payload).map_err(ServiceError::Validation)?;
            let status = TodoStatus::parse(&payload.status)
                .ok_or_else(|| ServiceError::Internal("unvalidated todo status".to_string()))?;

            todo.name = payload.name;
            todo.status = status;
            todo.updated_at = Utc::now();
            self.todos.update(&todo).await?;

            info!(todo_id = %todo.id, status = %todo.status, "Todo updated");
            Ok(Response::ok("success", todo))
        })
        .await
    }

    /// Soft-deletes one of the caller's todos
    #[instrument(skip(self, claim), fields(user_id = %claim.user_id))]
    pub async fn delete(&self, claim: &SessionClaim, todo_id: &str) -> ServiceResult<Response<()>> {
        with_deadline(self.timeout, async {
            let todo = self.find_owned(claim, todo_id).await?;
            self.todos.soft_delete(&todo).await?;

            info!(todo_id = %todo.id, "Todo deleted");
            Ok(Response::message(StatusCode::OK, "todo successfully deleted"))
        })
        .await
    }

    async fn find_owned(&self, claim: &SessionClaim, todo_id: &str) -> ServiceResult<Todo> {
        let id = Uuid::parse_str(todo_id).map_err(|_| BusinessRule::TodoNotFound)?;

        let todo = self
            .todos
            .find_one(&TodoFilter::owned_by(claim.user_id).with_id(id))
            .await?
            .ok_or(BusinessRule::TodoNotFound)?;

        Ok(todo)
    }
}
