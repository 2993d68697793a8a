//! REST API module.
//!
//! Admin routes sit behind the PSK layer; the public read does not.

mod admin;
mod public;

pub use admin::*;
pub use public::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::{AppError, AppErrorWithRevision};

/// Success response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub revision_id: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, revision_id: i64) -> Self {
        Self {
            success: true,
            data,
            revision_id,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppErrorWithRevision>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T, revision_id: i64) -> ApiResult<T> {
    Ok(ApiResponse::new(data, revision_id))
}

/// Create an error API response.
///
/// A write conflict reports the revision the caller should reload.
pub fn error<T: Serialize>(err: AppError, revision_id: i64) -> ApiResult<T> {
    let revision_id = match &err {
        AppError::WriteConflict {
            current_revision, ..
        } => *current_revision,
        _ => revision_id,
    };

    if err.status_code().is_server_error() {
        tracing::warn!(
            code = err.error_code(),
            retryable = err.is_retryable(),
            "Request failed: {}",
            err.message()
        );
    } else {
        tracing::debug!(code = err.error_code(), "Request rejected: {}", err.message());
    }

    Err(AppErrorWithRevision {
        error: err,
        revision_id,
    })
}
