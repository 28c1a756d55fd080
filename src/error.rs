// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::db::StoreError;
use axum::{
    extract::rejection::{FormRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Shown for every unknown or malformed user id.
pub const UNKNOWN_USER_MESSAGE: &str = "There are no users matching the given user id.";

/// Generic text for store failures outside the log query.
pub const STORE_UNAVAILABLE_MESSAGE: &str = "Exercise data could not be accessed.";

/// Generic text for store failures while reading an exercise log.
pub const LOG_UNAVAILABLE_MESSAGE: &str = "Exercise log could not be retrieved for user.";

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Date {field} provided must use correct yyyy-mm-dd format.")]
    InvalidDate { field: &'static str },

    #[error("Exercise limit must be a positive whole number.")]
    InvalidLimit,

    #[error("Malformed user id: {0}")]
    InvalidId(String),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Storage unavailable: {detail}")]
    StorageUnavailable {
        message: &'static str,
        detail: String,
    },
}

impl AppError {
    /// Replace the caller-facing text of a storage failure, leaving other
    /// errors untouched.
    pub fn with_unavailable_message(self, text: &'static str) -> Self {
        match self {
            AppError::StorageUnavailable { detail, .. } => AppError::StorageUnavailable {
                message: text,
                detail,
            },
            other => other,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidDate { .. }
            | AppError::InvalidLimit
            | AppError::InvalidId(_)
            | AppError::NotFound(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::StorageUnavailable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Caller-facing message. Storage details are never exposed.
    pub fn public_message(&self) -> String {
        match self {
            AppError::InvalidId(_) | AppError::NotFound(_) => UNKNOWN_USER_MESSAGE.to_string(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::StorageUnavailable { message, .. } => message.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidId(id) => AppError::InvalidId(id),
            StoreError::Unavailable(detail) | StoreError::Pipeline(detail) => {
                AppError::StorageUnavailable {
                    message: STORE_UNAVAILABLE_MESSAGE,
                    detail,
                }
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::BadRequest(errors.to_string())
    }
}

/// Malformed query strings (e.g. a repeated key) keep the JSON error shape.
impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    status: u16,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::StorageUnavailable { detail, .. } => {
                tracing::error!(error = %detail, "Storage error");
            }
            AppError::InvalidId(id) | AppError::NotFound(id) => {
                tracing::debug!(user_id = %id, "Unknown user id");
            }
            _ => {}
        }

        let body = ErrorResponse {
            status: status.as_u16(),
            message: self.public_message(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
