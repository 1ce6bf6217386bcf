/// Uniform response envelopes
///
/// Every operation answers with one of two shapes:
///
/// ```json
/// { "status": 200, "message": "success", "data": {...}, "validation": [...] }
/// { "status": 200, "message": "success", "data": [...], "meta": { "page": 1, "limit": 10, "total": 3 } }
/// ```
///
/// `data` and `validation` are omitted from the plain envelope when absent.
/// The HTTP status of the transport response always equals `status`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response as HttpResponse},
    Json,
};
use serde::Serialize;

/// One failing field of a validated payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    /// Payload field name
    pub field: String,

    /// Failing rule (`required`, `email`, `todo_status`, ...)
    pub tag: String,

    /// Rejected value, `null` for secrets
    pub value: serde_json::Value,
}

/// Plain envelope
#[derive(Debug, Clone, Serialize)]
pub struct Response<T = serde_json::Value> {
    pub status: u16,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validation: Vec<ValidationIssue>,
}

impl<T> Response<T> {
    /// 200 with data
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::OK, message, Some(data))
    }

    /// 201 with data
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::CREATED, message, Some(data))
    }

    /// Envelope with an explicit status and optional data
    pub fn with_status(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            data,
            validation: Vec::new(),
        }
    }
}

impl Response<()> {
    /// Envelope without data
    pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
        Self::with_status(status, message, None)
    }

    /// 400 "Error Validation" carrying the failing fields
    pub fn validation(issues: Vec<ValidationIssue>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST.as_u16(),
            message: "Error Validation".to_string(),
            data: None,
            validation: issues,
        }
    }
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
}

/// Envelope for list endpoints; `data` is always present
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub status: u16,
    pub message: String,
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> PaginatedResponse<T> {
    /// 200 page of results
    pub fn ok(data: Vec<T>, meta: PageMeta) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            message: "success".to_string(),
            data,
            meta,
        }
    }
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl<T: Serialize> IntoResponse for Response<T> {
    fn into_response(self) -> HttpResponse {
        (status_code(self.status), Json(self)).into_response()
    }
}

impl<T: Serialize> IntoResponse for PaginatedResponse<T> {
    fn into_response(self) -> HttpResponse {
        (status_code(self.status), Json(self)).into_response()
    }
}
