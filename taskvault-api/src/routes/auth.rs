/// Authentication endpoints
///
/// - `POST /user/auth/register` - Register new user
/// - `POST /user/auth/login` - Login and get a session token
/// - `GET /user/auth/profile` - Current user with avatar

use crate::{
    app::AppState,
    error::{ApiResult, JsonBody},
};
use axum::{extract::State, Extension};
use taskvault_shared::{
    auth::jwt::SessionClaim,
    models::user::{User, UserProfile},
    response::Response,
    services::auth::{LoginData, LoginRequest, RegisterRequest},
};

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /user/auth/register
/// Content-Type: application/json
///
/// {
///   "name": "Alice",
///   "email": "alice@example.com",
///   "password": "secret"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: validation failed, email already registered or
///   body is not JSON
/// - `500 Internal Server Error`: server error
pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> ApiResult<Response<User>> {
    Ok(state.auth.register(req).await?)
}

/// Login and receive a session token
///
/// # Response
///
/// ```json
/// {
///   "status": 200,
///   "message": "login success",
///   "data": { "token": "eyJ...", "user": { "id": "uuid", "name": "Alice", ... } }
/// }
/// ```
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> ApiResult<Response<LoginData>> {
    Ok(state.auth.login(req).await?)
}

/// Current user's profile
pub async fn profile(
    State(state): State<AppState>,
    Extension(claim): Extension<SessionClaim>,
) -> ApiResult<Response<UserProfile>> {
    Ok(state.auth.get_profile(&claim).await?)
}
