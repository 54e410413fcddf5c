//! Capability guard for administrator-only routes.

use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::Response,
};

use crate::errors::AppError;
use crate::middleware::auth_guard::AuthUser;

/// Middleware: require the admin capability. The single authorization check
/// every `/admin` route runs behind.
pub async fn require_admin(
    Extension(user): Extension<AuthUser>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !user.is_admin {
        return Err(AppError::Forbidden);
    }
    Ok(next.run(req).await)
}
