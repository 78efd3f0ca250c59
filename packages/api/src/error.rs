// ABOUTME: API error type and its HTTP mapping
// ABOUTME: Converts domain errors into status codes with sanitized JSON bodies

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use autohub_storage::{is_unique_violation, StorageError};

/// Main application error type that all handlers should return
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("{0} not found")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

/// Structured error response format for API consistency
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: ErrorDetail,
    request_id: String,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl AppError {
    fn to_status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Forbidden { .. } => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            AppError::InvalidState(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_STATE"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// Get user-friendly error message (sanitized for external consumption)
    fn to_user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Unauthorized => {
                "Missing or invalid x-user-id / x-user-role headers".to_string()
            }
            AppError::Forbidden { message } => message.clone(),
            AppError::NotFound(_) | AppError::Conflict(_) | AppError::InvalidState(_) => {
                self.to_string()
            }
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Validation(msg) => AppError::Validation(msg),
            StorageError::Forbidden(message) => AppError::Forbidden { message },
            StorageError::NotFound(entity) => AppError::NotFound(entity),
            StorageError::Conflict(msg) => AppError::Conflict(msg),
            StorageError::InvalidState(msg) => AppError::InvalidState(msg),
            StorageError::Sqlx(sqlx::Error::RowNotFound) => {
                AppError::NotFound("Resource".to_string())
            }
            StorageError::Sqlx(ref db_err) if is_unique_violation(db_err) => {
                AppError::Conflict("Resource already exists".to_string())
            }
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();
        let (status_code, error_code) = self.to_status_and_code();
        let user_message = self.to_user_message();

        match &self {
            AppError::Internal(err) => {
                error!(
                    request_id = %request_id,
                    error = %err,
                    "Internal server error occurred"
                );
            }
            _ => {
                info!(
                    request_id = %request_id,
                    error_code = %error_code,
                    error = %self,
                    "API error response"
                );
            }
        }

        let body = ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: error_code.to_string(),
                message: user_message,
            },
            request_id,
        };

        (status_code, Json(body)).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_errors_map_to_status_codes() {
        let cases = [
            (StorageError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (StorageError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (StorageError::NotFound("Vehicle".into()), StatusCode::NOT_FOUND),
            (StorageError::Conflict("dup".into()), StatusCode::CONFLICT),
            (
                StorageError::InvalidState("locked".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                StorageError::Sqlx(sqlx::Error::RowNotFound),
                StatusCode::NOT_FOUND,
            ),
            (
                StorageError::InvalidData("corrupt".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (storage_err, expected) in cases {
            let (status, _) = AppError::from(storage_err).to_status_and_code();
            assert_eq!(status, expected);
        }
    }

    #[test]
    fn test_user_message_sanitization() {
        let internal_error = AppError::from(StorageError::InvalidData(
            "password column holds xyz".to_string(),
        ));
        let message = internal_error.to_user_message();
        assert_eq!(message, "An internal server error occurred");
        assert!(!message.contains("xyz"));
    }

    #[test]
    fn test_not_found_message_names_entity() {
        let error = AppError::from(StorageError::NotFound("Collection".to_string()));
        assert_eq!(error.to_user_message(), "Collection not found");
    }
}
