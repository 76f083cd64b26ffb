//! Application error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// A single field-level validation failure
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    /// Unknown email and wrong password map to the same message so the
    /// response never distinguishes the two.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with that email already exists")]
    DuplicateEmail,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Insufficient privileges")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Favorites limit of {0} reached")]
    LimitExceeded(usize),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn code(&self) -> &'static str {
        match self {
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::DuplicateEmail => "DUPLICATE_EMAIL",
            AppError::NotAuthenticated => "UNAUTHORIZED",
            AppError::Forbidden => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_FAILED",
            AppError::LimitExceeded(_) => "LIMIT_EXCEEDED",
            AppError::Internal(_) => "SERVER_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::LimitExceeded(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(msg) = &self {
            tracing::error!("Internal error: {}", msg);
        }

        let message = match &self {
            // Never leak internals to the client
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let mut body = json!({
            "success": false,
            "code": self.code(),
            "message": message,
        });

        if let AppError::Validation(fields) = &self {
            body["errors"] = serde_json::to_value(fields).unwrap_or_default();
        }

        (self.status(), axum::Json(body)).into_response()
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(e: bcrypt::BcryptError) -> Self {
        AppError::Internal(e.to_string())
    }
}
