//! Error handling module for the configuration backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::validation::ValidationIssue;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const NOTHING_TO_PUBLISH: &str = "NOTHING_TO_PUBLISH";
    pub const WRITE_CONFLICT: &str = "WRITE_CONFLICT";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const OUTCOME_UNKNOWN: &str = "OUTCOME_UNKNOWN";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Authentication required
    Unauthorized(String),
    /// Singleton row never created, or nothing ever published
    NotFound(String),
    /// Blocking content-rule violations found while publishing
    ValidationFailed(Vec<ValidationIssue>),
    /// Publish requested without a draft
    NothingToPublish,
    /// Optimistic revision mismatch
    WriteConflict {
        message: String,
        current_revision: i64,
    },
    /// Database or I/O failure
    Storage(String),
    /// The store call timed out; it may or may not have committed
    OutcomeUnknown(String),
    /// Internal server error
    Internal(String),
    /// Bad request
    BadRequest(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NothingToPublish => StatusCode::CONFLICT,
            AppError::WriteConflict { .. } => StatusCode::CONFLICT,
            AppError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::OutcomeUnknown(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::ValidationFailed(_) => codes::VALIDATION_FAILED,
            AppError::NothingToPublish => codes::NOTHING_TO_PUBLISH,
            AppError::WriteConflict { .. } => codes::WRITE_CONFLICT,
            AppError::Storage(_) => codes::STORAGE_ERROR,
            AppError::OutcomeUnknown(_) => codes::OUTCOME_UNKNOWN,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::ValidationFailed(issues) => {
                format!("Draft failed validation with {} issue(s)", issues.len())
            }
            AppError::NothingToPublish => "There is no draft to publish".to_string(),
            AppError::WriteConflict { message, .. } => message.clone(),
            AppError::Storage(msg) => msg.clone(),
            AppError::OutcomeUnknown(msg) => msg.clone(),
            AppError::Internal(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
        }
    }

    /// Build the write-conflict error shown to an admin whose save raced another.
    pub fn conflict(current_revision: i64) -> Self {
        AppError::WriteConflict {
            message: "Your changes conflict with a more recent save. Reload and reapply them."
                .to_string(),
            current_revision,
        }
    }

    /// Whether a caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Storage(_))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Storage(format!("Database error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::Internal(format!("JSON error: {}", err))
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
    pub revision_id: i64,
}

impl ErrorResponse {
    pub fn new(error: &AppError, revision_id: i64) -> Self {
        let details = match error {
            AppError::WriteConflict {
                current_revision, ..
            } => Some(serde_json::json!({ "currentRevision": current_revision })),
            AppError::ValidationFailed(issues) => Some(serde_json::json!({
                "errors": issues.iter().map(ToString::to_string).collect::<Vec<_>>(),
            })),
            AppError::Storage(_) => Some(serde_json::json!({ "retryable": true })),
            _ => None,
        };

        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.message(),
                details,
            },
            revision_id,
        }
    }
}

/// Wrapper type for errors that carry revision_id context.
pub struct AppErrorWithRevision {
    pub error: AppError,
    pub revision_id: i64,
}

impl IntoResponse for AppErrorWithRevision {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let body = ErrorResponse::new(&self.error, self.revision_id);
        (status, Json(body)).into_response()
    }
}
