/// Registration, login and profile lookup

use super::{with_deadline, BusinessRule, ServiceError, ServiceResult};
use crate::auth::jwt::{SessionClaim, TokenIssuer};
use crate::auth::password::{hash_password, verify_password};
use crate::models::file::{File, FileFilter};
use crate::models::user::{User, UserFilter, UserProfile, EMAIL_UNIQUE_INDEX};
use crate::repository::{Repository, RepositoryError};
use crate::response::Response;
use crate::validation::validate_payload;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc, time::Duration};
use tracing::{info, instrument};
use validator::Validate;

/// Register payload
#[derive(Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterRequest {
    #[validate(length(min = 1, code = "required"))]
    pub name: String,

    #[validate(length(min = 1, code = "required"), email)]
    pub email: String,

    #[validate(length(min = 1, code = "required"))]
    pub password: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Login payload
#[derive(Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(length(min = 1, code = "required"), email)]
    pub email: String,

    #[validate(length(min = 1, code = "required"))]
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login
#[derive(Debug, Clone, Serialize)]
pub struct LoginData {
    pub token: String,
    pub user: User,
}

/// Account orchestrator
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn Repository<User>>,
    files: Arc<dyn Repository<File>>,
    tokens: Arc<TokenIssuer>,
    timeout: Duration,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn Repository<User>>,
        files: Arc<dyn Repository<File>>,
        tokens: Arc<TokenIssuer>,
        timeout: Duration,
    ) -> Self {
        Self {
            users,
            files,
            tokens,
            timeout,
        }
    }

    /// Creates an account; the email must not belong to an active user
    #[instrument(skip(self, payload), fields(email = %payload.email))]
    pub async fn register(&self, payload: RegisterRequest) -> ServiceResult<Response<User>> {
        with_deadline(self.timeout, async {
            validate_payload(&payload).map_err(ServiceError::Validation)?;

            let existing = self
                .users
                .find_one(&UserFilter::by_email(&payload.email))
                .await?;
            if existing.is_some() {
                return Err(BusinessRule::DuplicateEmail.into());
            }

            let password_hash = hash_password(&payload.password)?;
            let user = User::new(payload.name, payload.email, password_hash);
            match self.users.create(&user).await {
                // Lost a race with a concurrent registration of the same email
                Err(RepositoryError::UniqueViolation { constraint, .. })
                    if constraint == EMAIL_UNIQUE_INDEX =>
                {
                    return Err(BusinessRule::DuplicateEmail.into());
                }
                result => result?,
            }

            info!(user_id = %user.id, "User registered");
            Ok(Response::created("user successfully registered", user))
        })
        .await
    }

    /// Checks credentials and issues a session token
    #[instrument(skip(self, payload), fields(email = %payload.email))]
    pub async fn login(&self, payload: LoginRequest) -> ServiceResult<Response<LoginData>> {
        with_deadline(self.timeout, async {
            validate_payload(&payload).map_err(ServiceError::Validation)?;

            let user = self
                .users
                .find_one(&UserFilter::by_email(&payload.email))
                .await?
                .ok_or(BusinessRule::EmailNotFound)?;

            // An unreadable stored hash is treated like a mismatch
            let matches = verify_password(&payload.password, &user.password_hash).unwrap_or(false);
            if !matches {
                return Err(BusinessRule::WrongPassword.into());
            }

            let token = self.tokens.issue(user.id, &user.email)?;

            info!(user_id = %user.id, "User logged in");
            Ok(Response::ok("login success", LoginData { token, user }))
        })
        .await
    }

    /// Returns the caller's account with its avatar
    #[instrument(skip(self, claim), fields(user_id = %claim.user_id))]
    pub async fn get_profile(&self, claim: &SessionClaim) -> ServiceResult<Response<UserProfile>> {
        with_deadline(self.timeout, async {
            let user = self
                .users
                .find_one(&UserFilter::by_id(claim.user_id))
                .await?
                .ok_or(BusinessRule::UserNotFound)?;

            let avatar = match user.avatar_id {
                Some(avatar_id) => self.files.find_one(&FileFilter::by_id(avatar_id)).await?,
                None => None,
            };

            Ok(Response::ok("success", UserProfile { user, avatar }))
        })
        .await
    }
}
