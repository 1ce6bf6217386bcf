/// Todo endpoints
///
/// All routes act on the caller's own todos. A todo owned by another user
/// answers exactly like a missing one.
///
/// - `GET /user/todo?page=1&limit=10` - List
/// - `POST /user/todo` - Create
/// - `GET /user/todo/:id` - Fetch one
/// - `PUT /user/todo/:id` - Overwrite name and status
/// - `DELETE /user/todo/:id` - Soft-delete

use crate::{
    app::AppState,
    error::{ApiResult, JsonBody},
};
use axum::{
    extract::{Path, Query, State},
    Extension,
};
use taskvault_shared::{
    auth::jwt::SessionClaim,
    models::todo::Todo,
    pagination::PageQuery,
    response::{PaginatedResponse, Response},
    services::todo::{CreateTodoRequest, UpdateTodoRequest},
};

/// Lists one page of the caller's todos
///
/// Missing, non-numeric or non-positive `page`/`limit` fall back to 1/10.
pub async fn list_todos(
    State(state): State<AppState>,
    Extension(claim): Extension<SessionClaim>,
    Query(query): Query<PageQuery>,
) -> ApiResult<PaginatedResponse<Todo>> {
    Ok(state.todos.list(&claim, &query).await?)
}

pub async fn get_todo(
    State(state): State<AppState>,
    Extension(claim): Extension<SessionClaim>,
    Path(id): Path<String>,
) -> ApiResult<Response<Todo>> {
    Ok(state.todos.get_one(&claim, &id).await?)
}

/// Creates a todo in `NotStarted` state
pub async fn create_todo(
    State(state): State<AppState>,
    Extension(claim): Extension<SessionClaim>,
    JsonBody(req): JsonBody<CreateTodoRequest>,
) -> ApiResult<Response<Todo>> {
    Ok(state.todos.create(&claim, req).await?)
}

/// Overwrites name and status; `status` is `NotStarted` or `Done`
pub async fn update_todo(
    State(state): State<AppState>,
    Extension(claim): Extension<SessionClaim>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateTodoRequest>,
) -> ApiResult<Response<Todo>> {
    Ok(state.todos.update(&claim, &id, req).await?)
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Extension(claim): Extension<SessionClaim>,
    Path(id): Path<String>,
) -> ApiResult<Response<()>> {
    Ok(state.todos.delete(&claim, &id).await?)
}
