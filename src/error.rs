//! Central error type + Axum integration.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

/// Application failure kinds, mapped onto HTTP statuses in one place.
///
/// Crypto and store failures carry no public detail; the failure site logs
/// the underlying error before returning the bare kind.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("unsupported sort spec: {0}")]
    InvalidSortSpec(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("missing or invalid bearer token")]
    InvalidToken,

    #[error("user already exists")]
    UserAlreadyExists,

    #[error("user not found")]
    UserNotFound,

    #[error("password hashing error")]
    PasswordHashing,

    #[error("cannot sign token")]
    TokenSigning,

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidSortSpec(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::UserAlreadyExists => StatusCode::CONFLICT,
            AppError::PasswordHashing
            | AppError::TokenSigning
            | AppError::Database(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 5xx responses never expose internals; the correlation id ties the
        // response to the server-side log line carrying the full error.
        if status.is_server_error() {
            let error_id = Uuid::new_v4();
            error!(%error_id, error = ?self, "request failed");
            let body = serde_json::json!({
                "error": "internal server error",
                "error_id": error_id,
            });
            return (status, Json(body)).into_response();
        }

        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("blocking task failed: {e}"))
    }
}
