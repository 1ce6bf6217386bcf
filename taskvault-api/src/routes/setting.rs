/// Profile settings endpoint
///
/// ```text
/// PUT /user/setting/profile
/// Authorization: Bearer <token>
///
/// {
///   "name": "Alice Cooper",
///   "profile_picture": "data:image/png;base64,iVBORw0..."
/// }
/// ```

use crate::{
    app::AppState,
    error::{ApiResult, JsonBody},
};
use axum::{extract::State, Extension};
use taskvault_shared::{
    auth::jwt::SessionClaim, models::user::User, response::Response,
    services::setting::UpdateProfileRequest,
};

/// Renames the caller and replaces their profile picture
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claim): Extension<SessionClaim>,
    JsonBody(req): JsonBody<UpdateProfileRequest>,
) -> ApiResult<Response<User>> {
    Ok(state.settings.update_profile(&claim, req).await?)
}
