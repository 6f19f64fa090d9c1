//! services/api/src/web/rejection.rs
//!
//! The single failure type returned by every handler. It pins the error
//! taxonomy to HTTP statuses and to the JSON body shape the frontend shows in
//! alerts: `{"error": "...", "details": "..."?}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use registrar_core::ports::PortError;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

/// Body carried by every failing response. `details` holds the underlying
/// store message when one exists.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// A classified handler failure.
///
/// Status mapping: missing/invalid token 401, disallowed role 403, missing
/// entity 404, duplicate key or invalid field value 400, store failure 500.
#[derive(Debug)]
pub struct Rejection {
    status: StatusCode,
    error: String,
    details: Option<String>,
}

impl Rejection {
    fn bare(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: None,
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::bare(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::bare(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::bare(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::bare(StatusCode::BAD_REQUEST, message)
    }

    /// A request field failed validation (e.g. an unknown role or gender value).
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::bare(StatusCode::BAD_REQUEST, message)
    }

    /// A store-level failure. `context` is the operation's own message; the
    /// underlying error message is surfaced in `details` for diagnosability.
    pub fn internal(context: &str, details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: context.to_string(),
            details: Some(details.into()),
        }
    }

    /// Classifies a port error under the given operation context.
    pub fn from_port(context: &str, err: PortError) -> Self {
        match err {
            PortError::NotFound(message) => Self::not_found(message),
            PortError::Conflict(message) => Self::conflict(message),
            PortError::Unexpected(message) => Self::internal(context, message),
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(
                error = %self.error,
                details = self.details.as_deref().unwrap_or(""),
                "request failed"
            );
        }
        let body = ErrorBody {
            error: self.error,
            details: self.details,
        };
        (self.status, Json(body)).into_response()
    }
}
