//! Authentication guard middleware.
//!
//! Reads the `session` cookie, validates it against `user_sessions` in the DB,
//! and injects an `AuthUser` extension into the request for downstream handlers.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{errors::AppError, state::AppState};

const SESSION_COOKIE: &str = "session";

/// Authenticated user extracted from a valid session. Injected into request
/// extensions by `require_auth`; downstream handlers use `Extension<AuthUser>`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id:  String,
    pub is_admin: bool,
}

/// Middleware: require any valid session cookie.
/// On success, inserts `AuthUser` into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    cookies: Cookies,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = cookies
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_owned())
        .ok_or(AppError::Unauthorized)?;

    #[derive(sqlx::FromRow)]
    struct SessionRow {
        id:       String,
        is_admin: bool,
    }

    let row = sqlx::query_as::<_, SessionRow>(
        "SELECT u.id, u.is_admin
         FROM user_sessions s
         JOIN users u ON u.id = s.user_id
         WHERE s.token = ?
           AND s.expires_at > NOW()
         LIMIT 1",
    )
    .bind(&token)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::Unauthorized)?;

    req.extensions_mut().insert(AuthUser {
        user_id:  row.id,
        is_admin: row.is_admin,
    });

    Ok(next.run(req).await)
}
