//! Error handling module for the greetings service.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.

use std::any::Any;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const CONFLICT: &str = "CONFLICT";
    pub const STORAGE_READ_ERROR: &str = "STORAGE_READ_ERROR";
    pub const STORAGE_WRITE_ERROR: &str = "STORAGE_WRITE_ERROR";
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Public message used in place of the cause for every 5xx response.
pub const INTERNAL_SERVER_ERROR_MESSAGE: &str = "Internal Server Error";

/// Application error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Malformed id or missing/blank required field
    InvalidArgument(String),
    /// Unknown record or route
    NotFound(String),
    /// Duplicate language
    Conflict(String),
    /// Backing store missing, unreadable or not a valid collection
    StorageRead(String),
    /// Collection could not be persisted
    StorageWrite(String),
    /// Invalid process configuration
    Config(String),
    /// Internal server error
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::StorageRead(_)
            | AppError::StorageWrite(_)
            | AppError::Config(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidArgument(_) => codes::INVALID_ARGUMENT,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Conflict(_) => codes::CONFLICT,
            AppError::StorageRead(_) => codes::STORAGE_READ_ERROR,
            AppError::StorageWrite(_) => codes::STORAGE_WRITE_ERROR,
            AppError::Config(_) => codes::CONFIG_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> &str {
        match self {
            AppError::InvalidArgument(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::StorageRead(msg)
            | AppError::StorageWrite(msg)
            | AppError::Config(msg)
            | AppError::Internal(msg) => msg,
        }
    }

    /// Whether this error is a server-side failure rather than a client mistake.
    pub fn is_internal(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        AppError::InvalidArgument(format!("Invalid request body: {}", rejection.body_text()))
    }
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorResponse {
    /// Build the envelope for `error`. The cause of a 5xx is only exposed when
    /// `include_detail` is set.
    pub fn new(error: &AppError, include_detail: bool) -> Self {
        if error.is_internal() {
            Self {
                success: false,
                error: INTERNAL_SERVER_ERROR_MESSAGE.to_string(),
                code: error.error_code().to_string(),
                detail: include_detail.then(|| error.message().to_string()),
            }
        } else {
            Self {
                success: false,
                error: error.message().to_string(),
                code: error.error_code().to_string(),
                detail: None,
            }
        }
    }
}

/// Wrapper type for errors that know whether internal detail may be exposed.
pub struct ApiError {
    pub error: AppError,
    pub include_detail: bool,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.error.is_internal() {
            tracing::error!("Request failed: {}", self.error);
        }
        let status = self.error.status_code();
        let body = ErrorResponse::new(&self.error, self.include_detail);
        (status, Json(body)).into_response()
    }
}

/// Render a caught handler panic as the standard JSON 500 envelope.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>, include_detail: bool) -> Response {
    let cause = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    ApiError {
        error: AppError::Internal(format!("Handler panicked: {}", cause)),
        include_detail,
    }
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::InvalidArgument("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::StorageRead("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::StorageWrite("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_client_error_body_carries_message() {
        let body = ErrorResponse::new(&AppError::Conflict("duplicate".into()), true);
        assert!(!body.success);
        assert_eq!(body.error, "duplicate");
        assert_eq!(body.code, codes::CONFLICT);
        assert!(body.detail.is_none());
    }

    #[test]
    fn test_internal_error_hides_cause_outside_development() {
        let err = AppError::StorageWrite("disk full".into());

        let hidden = ErrorResponse::new(&err, false);
        assert_eq!(hidden.error, INTERNAL_SERVER_ERROR_MESSAGE);
        assert!(hidden.detail.is_none());

        let shown = ErrorResponse::new(&err, true);
        assert_eq!(shown.error, INTERNAL_SERVER_ERROR_MESSAGE);
        assert_eq!(shown.detail.as_deref(), Some("disk full"));
    }

    #[test]
    fn test_panic_response_is_500() {
        let resp = panic_response(Box::new("boom"), false);
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
