//! Application error taxonomy and the shared error reporter.
//!
//! Every failure surfaced to a client uses the same JSON envelope:
//! `{ success: false, message, error: { code, details }, timestamp }`.
//! Full detail is logged server-side; credential, token and OTP failures are
//! indistinguishable from the outside.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

use crate::bot::transport::TransportError;
use crate::storage::StorageError;

/// Convenience alias for fallible service and handler functions.
pub type AppResult<T> = Result<T, AppError>;

/// Domain and upstream failures, raised at the point of detection.
#[derive(Debug, Error)]
pub enum AppError {
    /// Unknown username or password mismatch; the two are never distinguished.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Refresh or access token failed verification (signature, expiry, shape).
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Hashing, signing, upload or bot-transport failure.
    #[error("{0}")]
    Upstream(String),

    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code rendered in the error envelope.
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Upstream(_) => "UPSTREAM_FAILURE",
            Self::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::InvalidToken => StatusCode::BAD_REQUEST,
            Self::Validation(_) | Self::Upstream(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Internal detail stays in the log; the client only sees the code.
        let details = match &self {
            AppError::Internal(detail) => {
                error!(error = %detail, "unhandled internal error");
                None
            }
            other => {
                debug!(code = other.code(), error = %other, "request failed");
                Some(other.to_string())
            }
        };

        let body = Json(json!({
            "success": false,
            "message": "Something went wrong",
            "error": {
                "code": self.code(),
                "details": details,
            },
            "timestamp": Utc::now().to_rfc3339(),
        }));

        (self.status(), body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".into()),
            _ => AppError::Internal(e.to_string()),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        AppError::Upstream(e.to_string())
    }
}

impl From<TransportError> for AppError {
    fn from(e: TransportError) -> Self {
        AppError::Upstream(e.to_string())
    }
}

/// Transport-agnostic error reporter, called uniformly from the HTTP boundary
/// and the bot event loop.
pub fn report(err: &AppError, context: &str) {
    error!(context, code = err.code(), error = %err, "operation failed");
}
