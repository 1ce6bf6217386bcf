/// Use-case orchestrators
///
/// Each service composes the password, token, repository and upload layers
/// into one user-facing operation and answers with a response envelope.
/// Every operation runs under a deadline taken from its configured timeout.
///
/// # Services
///
/// - [`auth::AuthService`]: register, login, profile
/// - [`setting::SettingService`]: profile update with photo upload
/// - [`todo::TodoService`]: per-user todo CRUD
///
/// # Error mapping
///
/// | Error                        | Status |
/// |------------------------------|--------|
/// | `Validation`                 | 400    |
/// | `BusinessRule`               | 400    |
/// | `Auth`                       | 401    |
/// | `Upload`                     | 500    |
/// | `Storage`/`Internal`/`Timeout` | 500  |
///
/// "Not found" outcomes are business-rule rejections and therefore 400.

pub mod auth;
pub mod setting;
pub mod todo;

use crate::auth::middleware::AuthError;
use crate::auth::password::PasswordError;
use crate::auth::jwt::TokenError;
use crate::repository::RepositoryError;
use crate::response::{Response, ValidationIssue};
use crate::upload::UploadError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response as HttpResponse},
};
use std::{fmt, future::Future, time::Duration};
use tracing::error;

/// Rejections caused by the caller's request rather than a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusinessRule {
    DuplicateEmail,
    EmailNotFound,
    WrongPassword,
    UserNotFound,
    TodoNotFound,
}

impl BusinessRule {
    pub fn message(&self) -> &'static str {
        match self {
            BusinessRule::DuplicateEmail => "email already exist",
            BusinessRule::EmailNotFound => "email not found",
            BusinessRule::WrongPassword => "wrong password",
            BusinessRule::UserNotFound => "user not found",
            BusinessRule::TodoNotFound => "todo not found",
        }
    }
}

impl fmt::Display for BusinessRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Error type for service operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Payload failed field validation
    #[error("Error Validation")]
    Validation(Vec<ValidationIssue>),

    /// Request rejected by a business rule
    #[error("{0}")]
    BusinessRule(BusinessRule),

    /// Caller not authenticated
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Upload pipeline failure
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Persistence failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Hashing or signing failure
    #[error("Internal error: {0}")]
    Internal(String),

    /// Deadline elapsed
    #[error("request timed out")]
    Timeout,
}

/// Service result type alias
pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<BusinessRule> for ServiceError {
    fn from(rule: BusinessRule) -> Self {
        ServiceError::BusinessRule(rule)
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        ServiceError::Storage(err.to_string())
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl From<TokenError> for ServiceError {
    fn from(err: TokenError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl ServiceError {
    /// HTTP status carried by the error envelope
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) | ServiceError::BusinessRule(_) => StatusCode::BAD_REQUEST,
            ServiceError::Auth(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Upload(_)
            | ServiceError::Storage(_)
            | ServiceError::Internal(_)
            | ServiceError::Timeout => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Error envelope
    pub fn to_response(&self) -> Response<()> {
        match self {
            ServiceError::Validation(issues) => Response::validation(issues.clone()),
            ServiceError::Storage(detail) | ServiceError::Internal(detail) => {
                error!(error = %detail, "Service operation failed");
                Response::message(self.status(), "internal server error")
            }
            other => Response::message(other.status(), other.to_string()),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> HttpResponse {
        self.to_response().into_response()
    }
}

/// Runs `operation` under `timeout`
pub async fn with_deadline<T, F>(timeout: Duration, operation: F) -> ServiceResult<T>
where
    F: Future<Output = ServiceResult<T>>,
{
    tokio::time::timeout(timeout, operation)
        .await
        .map_err(|_| ServiceError::Timeout)?
}
