//! Application error taxonomy. Every handler returns [`AppResult`]; the
//! [`IntoResponse`] impl turns a failure into a JSON body and status code, so
//! a single request's failure never takes down anything else.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or wrong credentials.
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated but not allowed: banned, non-admin on an admin route.
    #[error("Forbidden")]
    Forbidden,

    /// Entity absent. Also covers another user's resource: ownership is
    /// enforced by filtering, so cross-user access looks identical to
    /// nonexistence.
    #[error("Not found")]
    NotFound,

    /// Duplicate username or email.
    #[error("{0}")]
    Conflict(String),

    /// Rejected input or a rejected operation (e.g. deleting a completed
    /// booking, self-targeting an admin action).
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(anyhow::anyhow!(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Conflict(_) => (StatusCode::CONFLICT, self.to_string()),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Internal(err) => {
                tracing::error!(error = ?err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_owned(),
                )
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
