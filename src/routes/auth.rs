use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_cookies::{
    cookie::{time::Duration as CookieDuration, SameSite},
    Cookie, Cookies,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{
        bans::{client_ip, is_banned},
        generate_token, hash_password, validate_password_strength, verify_password,
    },
    db::Db,
    errors::{AppError, AppResult},
    state::AppState,
};

// ── Session cookie constants ──────────────────────────────────

const SESSION_COOKIE: &str = "session";
const SESSION_DAYS:   i64  = 30;

// ── Request / response types ──────────────────────────────────

#[derive(Deserialize, Validate)]
struct RegisterRequest {
    #[validate(length(min = 3, max = 80))]
    username: String,
    #[validate(email)]
    email:    String,
    password: String,
    #[validate(length(max = 20))]
    phone:    Option<String>,
}

#[derive(Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Serialize)]
struct UserResponse {
    id:       String,
    username: String,
    email:    String,
    phone:    Option<String>,
    is_admin: bool,
}

// ── Database row types (runtime queries, no DATABASE_URL at compile time) ──────

#[derive(sqlx::FromRow)]
struct UserRow {
    id:            String,
    username:      String,
    email:         String,
    phone_number:  Option<String>,
    password_hash: String,
    is_admin:      bool,
}

#[derive(sqlx::FromRow)]
struct MeRow {
    id:           String,
    username:     String,
    email:        String,
    phone_number: Option<String>,
    is_admin:     bool,
}

// ── Router ────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login",    post(login))
        .route("/auth/logout",   post(logout))
        .route("/auth/me",       get(me))
}

// ── Handlers ──────────────────────────────────────────────────

/// POST /auth/register — create a new customer account.
///
/// The first account in an empty system becomes the administrator.
async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let pool   = &state.pool;
    let config = &state.config;

    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    // DEV: password strength is disabled in development for easy testing.
    // PRODUCTION: remove this guard so all passwords are validated.
    if config.app_env != "development" {
        validate_password_strength(&body.password)?;
    }

    // Denylist check comes before everything else: banned identities never
    // reach the uniqueness checks.
    let ip = client_ip(&headers);
    if is_banned(pool, Some(&body.email), body.phone.as_deref(), ip.as_deref()).await? {
        return Err(AppError::Forbidden);
    }

    // Check username not already taken
    let username_taken: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)",
    )
    .bind(&body.username)
    .fetch_one(pool)
    .await?;
    if username_taken {
        return Err(AppError::Conflict("Username is already taken".into()));
    }

    // Check email not already taken
    let email_taken: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)",
    )
    .bind(&body.email)
    .fetch_one(pool)
    .await?;
    if email_taken {
        return Err(AppError::Conflict("Email address is already registered".into()));
    }

    let user_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    let is_admin = user_count == 0;

    let hash = hash_password(&body.password)?;
    let id   = Uuid::new_v4().to_string();

    let insert_result = sqlx::query(
        "INSERT INTO users (id, username, email, phone_number, password_hash, is_admin)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&body.username)
    .bind(&body.email)
    .bind(&body.phone)
    .bind(hash)
    .bind(is_admin)
    .execute(pool)
    .await;

    // Guard against duplicate key (race condition / double-submit)
    if let Err(sqlx::Error::Database(ref db_err)) = insert_result {
        if db_err.code().as_deref() == Some("23000") {
            return Err(AppError::Conflict("Username or email is already taken".into()));
        }
    }
    insert_result?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "message": "Account created. You can now log in." })),
    ))
}

/// POST /auth/login — username + password.
///
/// The denylist is consulted after the user is identified but before the
/// password is verified, so a ban blocks login even with correct credentials.
async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    cookies: Cookies,
    Json(body): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let pool = &state.pool;

    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, email, phone_number, password_hash, is_admin
         FROM users WHERE username = ? LIMIT 1",
    )
    .bind(&body.username)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::Unauthorized)?;

    let ip = client_ip(&headers);
    if is_banned(pool, Some(&row.email), row.phone_number.as_deref(), ip.as_deref()).await? {
        return Err(AppError::Forbidden);
    }

    verify_password(&body.password, &row.password_hash)?;

    // Create session
    let session_token = create_session(pool, &row.id, SESSION_DAYS).await?;
    set_session_cookie(&cookies, &session_token, SESSION_DAYS);

    Ok(Json(UserResponse {
        id:       row.id,
        username: row.username,
        email:    row.email,
        phone:    row.phone_number,
        is_admin: row.is_admin,
    }))
}

/// POST /auth/logout — delete the current session.
async fn logout(
    State(state): State<AppState>,
    cookies: Cookies,
) -> AppResult<impl IntoResponse> {
    let pool = &state.pool;
    if let Some(token) = cookies.get(SESSION_COOKIE).map(|c| c.value().to_owned()) {
        sqlx::query("DELETE FROM user_sessions WHERE token = ?")
            .bind(&token)
            .execute(pool)
            .await?;
    }
    clear_session_cookie(&cookies);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /auth/me — return the currently logged-in user.
async fn me(
    State(state): State<AppState>,
    cookies: Cookies,
) -> AppResult<impl IntoResponse> {
    let pool = &state.pool;
    let token = cookies
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_owned())
        .ok_or(AppError::Unauthorized)?;

    let row = sqlx::query_as::<_, MeRow>(
        "SELECT u.id, u.username, u.email, u.phone_number, u.is_admin
         FROM user_sessions s
         JOIN users u ON u.id = s.user_id
         WHERE s.token = ? AND s.expires_at > NOW()
         LIMIT 1",
    )
    .bind(&token)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::Unauthorized)?;

    Ok(Json(UserResponse {
        id:       row.id,
        username: row.username,
        email:    row.email,
        phone:    row.phone_number,
        is_admin: row.is_admin,
    }))
}

// ── Internal helpers ──────────────────────────────────────────

async fn create_session(pool: &Db, user_id: &str, days: i64) -> AppResult<String> {
    let token = generate_token();
    let id    = Uuid::new_v4().to_string();
    let expires_at =
        (Utc::now() + chrono::Duration::days(days)).naive_utc();

    sqlx::query(
        "INSERT INTO user_sessions (id, user_id, token, expires_at) VALUES (?, ?, ?, ?)",
    )
    .bind(id)
    .bind(user_id)
    .bind(&token)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(token)
}

fn set_session_cookie(cookies: &Cookies, token: &str, days: i64) {
    let cookie = Cookie::build((SESSION_COOKIE, token.to_owned()))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(CookieDuration::days(days))
        .build();
    cookies.add(cookie);
}

fn clear_session_cookie(cookies: &Cookies) {
    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .path("/")
        .max_age(CookieDuration::ZERO)
        .build();
    cookies.add(cookie);
}
