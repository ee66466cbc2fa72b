//! HTTP error handling.
//!
//! Every failure leaves the server as an [`ApiResponse`] envelope with
//! `success: false`. Status codes:
//!
//! | Source | Status | `error.kind` |
//! |---|---|---|
//! | validation rejection | 409 | conflict kind |
//! | `NotFound` | 404 | `not-found` |
//! | malformed input | 400 | `invalid-input` |
//! | store failure | 500 | `store-error` |

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;

use crate::api::{ApiErrorBody, ApiResponse};
use crate::db::repository::RepositoryError;
use crate::models::ConflictDetail;

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// A write was rejected by a conflict validator.
    Conflict(ConflictDetail),
    /// Request could not be decoded or failed structural checks.
    BadRequest(String),
    Internal(String),
    Repository(RepositoryError),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ApiErrorBody) {
        match self {
            AppError::Conflict(conflict) => (StatusCode::CONFLICT, ApiErrorBody::from(&conflict)),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody::new("invalid-input", msg),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorBody::new("store-error", msg),
            ),
            AppError::Repository(e) => {
                let status = match &e {
                    RepositoryError::NotFound { .. } => StatusCode::NOT_FOUND,
                    RepositoryError::ValidationError { .. } => StatusCode::BAD_REQUEST,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status.is_server_error() {
                    error!("Request failed: {}", e);
                }
                (status, ApiErrorBody::new(e.kind(), e.message()))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(ApiResponse::<()>::failure(body))).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConflictKind;

    #[test]
    fn test_repository_errors_map_to_statuses() {
        let (status, body) =
            AppError::from(RepositoryError::not_found("Assignment 3 not found")).status_and_body();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.kind, "not-found");
        assert_eq!(body.message, "Assignment 3 not found");

        let (status, body) =
            AppError::from(RepositoryError::validation("term must not be empty")).status_and_body();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.kind, "invalid-input");

        let (status, body) =
            AppError::from(RepositoryError::connection("pool exhausted")).status_and_body();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.kind, "store-error");
    }

    #[test]
    fn test_conflict_is_409_with_kind() {
        let (status, body) =
            AppError::Conflict(ConflictDetail::new(ConflictKind::Instructor, "busy"))
                .status_and_body();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.kind, "instructor-conflict");
        assert_eq!(body.message, "busy");
    }
}
