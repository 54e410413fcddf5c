//! `/admin` routes — user management, sale management, booking management,
//! and the bootstrap-admin toggle. All routes in this module require the
//! admin capability (enforced via the `require_admin` guard applied here).

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::BootstrapAdmin,
    errors::{AppError, AppResult},
    middleware::{auth_guard::AuthUser, role_guard::require_admin},
    models::BookingStatus,
    routes::bookings,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    use axum::middleware;
    // require_admin reads Extension<AuthUser> (injected by require_auth in mod.rs);
    // it does not need AppState, so plain from_fn is sufficient.
    let admin_guard = middleware::from_fn(require_admin);
    Router::new()
        .route("/admin/users",                   get(list_users))
        .route("/admin/users/{id}",              axum::routing::delete(delete_user))
        .route("/admin/users/{id}/toggle-admin", post(toggle_admin))
        .route("/admin/users/{id}/ban",          post(ban_user))
        .route("/admin/sales",                   get(list_sales).post(create_sale))
        .route("/admin/sales/{id}",              put(update_sale).delete(delete_sale))
        .route("/admin/bookings",                get(list_all_bookings))
        .route("/admin/bookings/{id}",           put(update_booking))
        .route("/admin/bootstrap-admin/toggle",  post(toggle_bootstrap_admin))
        .route_layer(admin_guard)
}

// ── Row types ────────────────────────────────────────────────

#[derive(sqlx::FromRow, Serialize)]
struct UserRow {
    id:           String,
    username:     String,
    email:        String,
    phone_number: Option<String>,
    is_admin:     bool,
    created_at:   chrono::NaiveDateTime,
}

#[derive(sqlx::FromRow, Serialize)]
struct SaleRow {
    id:                  String,
    name:                String,
    discount_percentage: f64,
    is_active:           bool,
    color:               String,
    created_at:          chrono::NaiveDateTime,
}

// ── Request bodies ───────────────────────────────────────────

#[derive(Deserialize)]
struct BanBody {
    reason: Option<String>,
}

#[derive(Deserialize)]
struct CreateSaleBody {
    name:                String,
    discount_percentage: f64,
    #[serde(default)]
    is_active:           bool,
    color:               Option<String>,
}

#[derive(Deserialize)]
struct UpdateSaleBody {
    name:                Option<String>,
    discount_percentage: Option<f64>,
    is_active:           Option<bool>,
    color:               Option<String>,
}

#[derive(Deserialize)]
struct UpdateBookingBody {
    status:      Option<BookingStatus>,
    admin_notes: Option<String>,
}

const DEFAULT_SALE_COLOR: &str = "#2ecc71";

// ── User handlers ────────────────────────────────────────────

async fn list_users(
    State(state): State<AppState>,
    Extension(_admin): Extension<AuthUser>,
) -> AppResult<Json<Vec<UserRow>>> {
    let pool = &state.pool;
    let rows: Vec<UserRow> = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, email, phone_number, is_admin, created_at
         FROM users
         ORDER BY username",
    )
    .fetch_all(pool)
    .await?;

    Ok(Json(rows))
}

/// DELETE /admin/users/{id} — remove an account and everything it owns.
/// Dependent rows go first so the foreign keys stay satisfied throughout.
async fn delete_user(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::BadRequest("Cannot delete your own account".into()));
    }
    let pool = &state.pool;

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
        .bind(&id)
        .fetch_one(pool)
        .await?;
    if !exists {
        return Err(AppError::NotFound);
    }

    let mut tx = pool.begin().await?;

    // Association rows hanging off the user's bookings, then the bookings.
    sqlx::query(
        "DELETE ba FROM booking_animals ba
         JOIN bookings b ON b.id = ba.booking_id
         WHERE b.user_id = ?",
    )
    .bind(&id)
    .execute(&mut *tx)
    .await?;
    sqlx::query("DELETE FROM bookings WHERE user_id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;

    // Association rows pointing at the user's animals (other users' bookings
    // may reference them), then the animals.
    sqlx::query(
        "DELETE ba FROM booking_animals ba
         JOIN animals a ON a.id = ba.animal_id
         WHERE a.user_id = ?",
    )
    .bind(&id)
    .execute(&mut *tx)
    .await?;
    sqlx::query("DELETE FROM animals WHERE user_id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM user_sessions WHERE user_id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/users/{id}/toggle-admin — flip the target's admin capability.
async fn toggle_admin(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<Json<UserRow>> {
    if id == admin.user_id {
        return Err(AppError::BadRequest("Cannot modify your own admin status".into()));
    }
    let pool = &state.pool;

    let affected = sqlx::query("UPDATE users SET is_admin = NOT is_admin WHERE id = ?")
        .bind(&id)
        .execute(pool)
        .await?
        .rows_affected();
    if affected == 0 {
        return Err(AppError::NotFound);
    }

    let row: UserRow = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, email, phone_number, is_admin, created_at
         FROM users WHERE id = ?",
    )
    .bind(&id)
    .fetch_one(pool)
    .await?;

    Ok(Json(row))
}

/// POST /admin/users/{id}/ban — denylist the target's current email and
/// phone. Only future logins and registrations are affected; any session the
/// target already holds stays alive.
async fn ban_user(
    State(state): State<AppState>,
    Extension(_admin): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Option<Json<BanBody>>,
) -> AppResult<StatusCode> {
    let pool = &state.pool;

    #[derive(sqlx::FromRow)]
    struct TargetRow {
        email:        String,
        phone_number: Option<String>,
    }

    let target = sqlx::query_as::<_, TargetRow>(
        "SELECT email, phone_number FROM users WHERE id = ? LIMIT 1",
    )
    .bind(&id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)?;

    let reason = body.and_then(|Json(b)| b.reason);

    sqlx::query(
        "INSERT INTO bans (id, email, phone_number, reason) VALUES (?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&target.email)
    .bind(&target.phone_number)
    .bind(&reason)
    .execute(pool)
    .await?;

    Ok(StatusCode::CREATED)
}

// ── Sale handlers ────────────────────────────────────────────

async fn list_sales(
    State(state): State<AppState>,
    Extension(_admin): Extension<AuthUser>,
) -> AppResult<Json<Vec<SaleRow>>> {
    let pool = &state.pool;
    let rows: Vec<SaleRow> = sqlx::query_as::<_, SaleRow>(
        "SELECT id, name, discount_percentage, is_active, color, created_at
         FROM sales
         ORDER BY created_at, id",
    )
    .fetch_all(pool)
    .await?;

    Ok(Json(rows))
}

async fn create_sale(
    State(state): State<AppState>,
    Extension(_admin): Extension<AuthUser>,
    Json(body): Json<CreateSaleBody>,
) -> AppResult<(StatusCode, Json<SaleRow>)> {
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }
    let pool = &state.pool;

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO sales (id, name, discount_percentage, is_active, color)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&body.name)
    .bind(body.discount_percentage)
    .bind(body.is_active)
    .bind(body.color.as_deref().unwrap_or(DEFAULT_SALE_COLOR))
    .execute(pool)
    .await?;

    let row: SaleRow = sqlx::query_as::<_, SaleRow>(
        "SELECT id, name, discount_percentage, is_active, color, created_at
         FROM sales WHERE id = ?",
    )
    .bind(&id)
    .fetch_one(pool)
    .await?;

    Ok((StatusCode::CREATED, Json(row)))
}

async fn update_sale(
    State(state): State<AppState>,
    Extension(_admin): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<UpdateSaleBody>,
) -> AppResult<Json<SaleRow>> {
    let pool = &state.pool;

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM sales WHERE id = ?)")
        .bind(&id)
        .fetch_one(pool)
        .await?;
    if !exists {
        return Err(AppError::NotFound);
    }

    if let Some(name) = &body.name {
        sqlx::query("UPDATE sales SET name = ? WHERE id = ?")
            .bind(name).bind(&id).execute(pool).await?;
    }
    if let Some(pct) = body.discount_percentage {
        sqlx::query("UPDATE sales SET discount_percentage = ? WHERE id = ?")
            .bind(pct).bind(&id).execute(pool).await?;
    }
    if let Some(active) = body.is_active {
        sqlx::query("UPDATE sales SET is_active = ? WHERE id = ?")
            .bind(active).bind(&id).execute(pool).await?;
    }
    if let Some(color) = &body.color {
        sqlx::query("UPDATE sales SET color = ? WHERE id = ?")
            .bind(color).bind(&id).execute(pool).await?;
    }

    let row: SaleRow = sqlx::query_as::<_, SaleRow>(
        "SELECT id, name, discount_percentage, is_active, color, created_at
         FROM sales WHERE id = ?",
    )
    .bind(&id)
    .fetch_one(pool)
    .await?;

    Ok(Json(row))
}

async fn delete_sale(
    State(state): State<AppState>,
    Extension(_admin): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let pool = &state.pool;

    // Bookings keep their recorded sale reference; only the catalog entry
    // goes away.
    let affected = sqlx::query("DELETE FROM sales WHERE id = ?")
        .bind(&id)
        .execute(pool)
        .await?
        .rows_affected();
    if affected == 0 {
        return Err(AppError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}

// ── Booking handlers ─────────────────────────────────────────

/// GET /admin/bookings — every booking in the system, animals resolved.
async fn list_all_bookings(
    State(state): State<AppState>,
    Extension(_admin): Extension<AuthUser>,
) -> AppResult<Json<Vec<bookings::BookingWithAnimals>>> {
    let rows = bookings::fetch_with_animals(&state.pool, None).await?;
    Ok(Json(rows))
}

/// PUT /admin/bookings/{id} — set status and/or admin notes.
///
/// Any status may be set from any status; the stored cost is never
/// recomputed here.
async fn update_booking(
    State(state): State<AppState>,
    Extension(_admin): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<UpdateBookingBody>,
) -> AppResult<Json<bookings::BookingWithAnimals>> {
    let pool = &state.pool;

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM bookings WHERE id = ?)")
        .bind(&id)
        .fetch_one(pool)
        .await?;
    if !exists {
        return Err(AppError::NotFound);
    }

    if let Some(status) = body.status {
        sqlx::query("UPDATE bookings SET status = ? WHERE id = ?")
            .bind(status)
            .bind(&id)
            .execute(pool)
            .await?;
    }
    if let Some(notes) = &body.admin_notes {
        sqlx::query("UPDATE bookings SET admin_notes = ? WHERE id = ?")
            .bind(notes)
            .bind(&id)
            .execute(pool)
            .await?;
    }

    let row = bookings::fetch_one_with_animals(pool, &id).await?;
    Ok(Json(row))
}

// ── Bootstrap admin ──────────────────────────────────────────

/// POST /admin/bootstrap-admin/toggle — flip the enabled flag in the
/// bootstrap-admin file and reconcile the matching user row. The file is
/// reloaded from disk first so external edits are honored.
async fn toggle_bootstrap_admin(
    State(state): State<AppState>,
    Extension(_admin): Extension<AuthUser>,
) -> AppResult<Json<serde_json::Value>> {
    let path = &state.config.bootstrap_admin_path;

    let mut bootstrap = BootstrapAdmin::load(path)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?
        .ok_or(AppError::NotFound)?;

    bootstrap.enabled = !bootstrap.enabled;
    bootstrap
        .store(path)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;

    crate::auth::seed::reconcile_bootstrap_admin(&state.pool, &bootstrap)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(serde_json::json!({
        "username": bootstrap.username,
        "enabled":  bootstrap.enabled,
    })))
}
