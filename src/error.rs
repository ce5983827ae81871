//! API error type shared by all route handlers.
//!
//! Maps domain failures onto the HTTP status categories the API exposes:
//! 400 malformed input, 401 unauthenticated, 403 not authorized, 404 missing
//! resource, 409 conflict/duplicate, 500 unexpected.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// JSON error body: `{"message": "...", "status": 403}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub status: u16,
}

impl ApiError {
    /// Remap a unique-constraint violation to `Conflict` with the given
    /// message. Handler pre-checks race with concurrent inserts, so the
    /// constraint has the last word; anything else stays internal.
    pub fn or_conflict(err: anyhow::Error, message: &str) -> Self {
        let unique_violation = err
            .downcast_ref::<tokio_postgres::Error>()
            .and_then(|db_err| db_err.code())
            == Some(&tokio_postgres::error::SqlState::UNIQUE_VIOLATION);
        if unique_violation {
            ApiError::Conflict(message.to_string())
        } else {
            ApiError::Internal(err)
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            // Never leak internal error chains to clients.
            ApiError::Internal(err) => {
                tracing::error!("internal error: {:#}", err);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            message,
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_variants_to_expected_status() {
        assert_eq!(
            ApiError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn anyhow_errors_convert_to_internal() {
        let err: ApiError = anyhow::anyhow!("db exploded").into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn or_conflict_keeps_unrelated_errors_internal() {
        let err = ApiError::or_conflict(anyhow::anyhow!("connection reset"), "duplicate");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
