//! REST API module.
//!
//! Contains the greeting routes and the response envelopes they share.

mod greetings;

pub use greetings::*;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::{ApiError, AppError};
use crate::service::GreetingService;
use crate::AppState;

/// Success response envelope. Which of the optional fields appear depends on the route.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip)]
    pub status: StatusCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// `200 {success, data}`
    pub fn found(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            success: Some(true),
            count: None,
            message: None,
            data,
        }
    }

    /// `201 {message, data}`
    pub fn created(message: &'static str, data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            success: None,
            count: None,
            message: Some(message),
            data,
        }
    }

    /// `200 {message, data}`
    pub fn updated(message: &'static str, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            success: None,
            count: None,
            message: Some(message),
            data,
        }
    }

    /// `200 {success, message, data}`
    pub fn deleted(message: &'static str, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            success: Some(true),
            count: None,
            message: Some(message),
            data,
        }
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// `200 {success, count, data}`
    pub fn listing(data: Vec<T>) -> Self {
        Self {
            status: StatusCode::OK,
            success: Some(true),
            count: Some(data.len()),
            message: None,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

/// Create an error API response.
pub fn error<T: Serialize>(err: AppError, state: &AppState) -> ApiResult<T> {
    Err(ApiError {
        error: err,
        include_detail: state.config.is_development(),
    })
}

/// Run a service call on the blocking pool; the store does synchronous file I/O.
pub async fn run_blocking<T, F>(state: &AppState, op: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&GreetingService) -> Result<T, AppError> + Send + 'static,
{
    let service = Arc::clone(&state.service);
    tokio::task::spawn_blocking(move || op(&service))
        .await
        .map_err(|e| AppError::Internal(format!("Greeting task failed: {}", e)))?
}
