/// Error handling for the API server
///
/// Handlers return `ApiResult<T>`. Service failures already know their
/// envelope; this type adds the transport-level failures (unreadable JSON
/// bodies) on top.
///
/// # Example
///
/// ```
/// use taskvault_api::error::{ApiResult, JsonBody};
/// use taskvault_shared::response::Response;
///
/// #[derive(serde::Deserialize)]
/// struct Ping {
///     message: String,
/// }
///
/// async fn handler(JsonBody(ping): JsonBody<Ping>) -> ApiResult<Response<String>> {
///     Ok(Response::ok("success", ping.message))
/// }
/// ```

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;
use taskvault_shared::{response::Response as Envelope, services::ServiceError};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Message returned when a request body cannot be bound
pub const INVALID_JSON_MESSAGE: &str = "invalid json data";

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Body missing, not JSON, or not the expected shape (400)
    InvalidJson(JsonRejection),

    /// Failure reported by a use-case orchestrator
    Service(ServiceError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidJson(rejection) => write!(f, "Invalid JSON body: {}", rejection.body_text()),
            ApiError::Service(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidJson(rejection)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidJson(rejection) => {
                tracing::debug!(reason = %rejection.body_text(), "Rejected request body");
                Envelope::message(StatusCode::BAD_REQUEST, INVALID_JSON_MESSAGE).into_response()
            }
            ApiError::Service(err) => err.into_response(),
        }
    }
}

/// `Json` extractor whose rejection is the 400 envelope
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use taskvault_shared::services::BusinessRule;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_service_error_keeps_its_envelope() {
        let err = ApiError::from(ServiceError::from(BusinessRule::TodoNotFound));
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["status"], 400);
        assert_eq!(body["message"], "todo not found");
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::from(ServiceError::Timeout);
        assert!(!err.to_string().is_empty());
    }
}
