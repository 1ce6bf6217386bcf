/// Profile settings

use super::{with_deadline, BusinessRule, ServiceError, ServiceResult};
use crate::auth::jwt::SessionClaim;
use crate::models::user::{User, UserFilter};
use crate::repository::Repository;
use crate::response::Response;
use crate::upload::{MediaCategory, Uploader, PROFILE_PICTURE_PREFIX};
use crate::validation::validate_payload;
use serde::Deserialize;
use std::{fmt, sync::Arc, time::Duration};
use tracing::{info, instrument};
use validator::Validate;

/// Profile update payload; `profile_picture` is a data URI
#[derive(Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, code = "required"))]
    pub name: String,

    #[validate(length(min = 1, code = "required"))]
    pub profile_picture: String,
}

impl fmt::Debug for UpdateProfileRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateProfileRequest")
            .field("name", &self.name)
            .field("profile_picture_len", &self.profile_picture.len())
            .finish()
    }
}

/// Profile orchestrator
#[derive(Clone)]
pub struct SettingService {
    users: Arc<dyn Repository<User>>,
    uploader: Uploader,
    timeout: Duration,
}

impl SettingService {
    pub fn new(users: Arc<dyn Repository<User>>, uploader: Uploader, timeout: Duration) -> Self {
        Self {
            users,
            uploader,
            timeout,
        }
    }

    /// Stores a new profile photo, then renames the user and points the
    /// avatar at the new file
    ///
    /// The photo is keyed by the user's name *before* the rename.
    #[instrument(skip(self, claim, payload), fields(user_id = %claim.user_id))]
    pub async fn update_profile(
        &self,
        claim: &SessionClaim,
        payload: UpdateProfileRequest,
    ) -> ServiceResult<Response<User>> {
        with_deadline(self.timeout, async {
            validate_payload(&payload).map_err(ServiceError::Validation)?;

            let mut user = self
                .users
                .find_one(&UserFilter::by_id(claim.user_id))
                .await?
                .ok_or(BusinessRule::UserNotFound)?;

            let file = self
                .uploader
                .upload(
                    &payload.profile_picture,
                    MediaCategory::Image,
                    PROFILE_PICTURE_PREFIX,
                    &user.name,
                )
                .await?;

            user.name = payload.name;
            user.avatar_id = Some(file.id);
            user.updated_at = chrono::Utc::now();
            self.users.update(&user).await?;

            info!(file_id = %file.id, "Profile updated");
            Ok(Response::ok("success", user))
        })
        .await
    }
}
