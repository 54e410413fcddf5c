//! `/bookings` routes — create, list, and cancel sitting requests.

use std::collections::HashMap;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::Db,
    errors::{AppError, AppResult},
    middleware::auth_guard::AuthUser,
    models::BookingStatus,
    services::pricing,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bookings",      get(list_bookings).post(create_booking))
        .route("/bookings/{id}", axum::routing::delete(delete_booking))
}

// ── Row types ────────────────────────────────────────────────

#[derive(sqlx::FromRow, Serialize)]
pub(crate) struct BookingRow {
    id:             String,
    user_id:        String,
    booking_name:   String,
    phone_number:   String,
    date:           NaiveDate,
    start_time:     NaiveTime,
    duration_hours: f64,
    total_cost:     f64,
    sale_applied:   Option<String>,
    status:         BookingStatus,
    admin_notes:    Option<String>,
    user_notes:     Option<String>,
    num_animals:    i32,
    created_at:     chrono::NaiveDateTime,
}

/// Animal resolved through the association table for a booking listing.
#[derive(sqlx::FromRow, Serialize)]
pub(crate) struct BookingAnimalRow {
    #[serde(skip_serializing)]
    booking_id:  String,
    id:          String,
    name:        String,
    animal_type: String,
    breed:       String,
}

#[derive(Serialize)]
pub(crate) struct BookingWithAnimals {
    #[serde(flatten)]
    booking: BookingRow,
    animals: Vec<BookingAnimalRow>,
}

const SELECT_BOOKING: &str =
    "SELECT id, user_id, booking_name, phone_number, date, start_time,
            duration_hours, total_cost, sale_applied, status, admin_notes,
            user_notes, num_animals, created_at
     FROM bookings";

// ── Request bodies ───────────────────────────────────────────

#[derive(Deserialize)]
struct CreateBookingBody {
    booking_name:        String,
    phone:               String,
    date:                NaiveDate,
    start_time:          NaiveTime,
    duration_hours:      f64,
    user_notes:          Option<String>,
    #[serde(default)]
    selected_animal_ids: Vec<String>,
}

// ── Shared queries (also used by the admin listing) ──────────

/// Fetch bookings, enriched with their resolved animals. `owner` limits the
/// result to one creator's bookings; `None` returns everything.
pub(crate) async fn fetch_with_animals(
    pool: &Db,
    owner: Option<&str>,
) -> AppResult<Vec<BookingWithAnimals>> {
    let bookings: Vec<BookingRow> = match owner {
        Some(user_id) => {
            sqlx::query_as::<_, BookingRow>(&format!(
                "{SELECT_BOOKING} WHERE user_id = ? ORDER BY date, start_time"
            ))
            .bind(user_id)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, BookingRow>(&format!(
                "{SELECT_BOOKING} ORDER BY date, start_time"
            ))
            .fetch_all(pool)
            .await?
        }
    };

    let links: Vec<BookingAnimalRow> = match owner {
        Some(user_id) => {
            sqlx::query_as::<_, BookingAnimalRow>(
                "SELECT ba.booking_id, a.id, a.name, a.animal_type, a.breed
                 FROM booking_animals ba
                 JOIN animals a ON a.id = ba.animal_id
                 JOIN bookings b ON b.id = ba.booking_id
                 WHERE b.user_id = ?
                 ORDER BY a.name",
            )
            .bind(user_id)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, BookingAnimalRow>(
                "SELECT ba.booking_id, a.id, a.name, a.animal_type, a.breed
                 FROM booking_animals ba
                 JOIN animals a ON a.id = ba.animal_id
                 ORDER BY a.name",
            )
            .fetch_all(pool)
            .await?
        }
    };

    Ok(attach_animals(bookings, links))
}

/// Fetch one booking with its animals, by id only (callers handle scoping).
pub(crate) async fn fetch_one_with_animals(pool: &Db, id: &str) -> AppResult<BookingWithAnimals> {
    let booking = sqlx::query_as::<_, BookingRow>(&format!("{SELECT_BOOKING} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)?;

    let animals: Vec<BookingAnimalRow> = sqlx::query_as::<_, BookingAnimalRow>(
        "SELECT ba.booking_id, a.id, a.name, a.animal_type, a.breed
         FROM booking_animals ba
         JOIN animals a ON a.id = ba.animal_id
         WHERE ba.booking_id = ?
         ORDER BY a.name",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(BookingWithAnimals { booking, animals })
}

fn attach_animals(
    bookings: Vec<BookingRow>,
    links: Vec<BookingAnimalRow>,
) -> Vec<BookingWithAnimals> {
    let mut by_booking: HashMap<String, Vec<BookingAnimalRow>> = HashMap::new();
    for link in links {
        by_booking.entry(link.booking_id.clone()).or_default().push(link);
    }

    bookings
        .into_iter()
        .map(|booking| {
            let animals = by_booking.remove(&booking.id).unwrap_or_default();
            BookingWithAnimals { booking, animals }
        })
        .collect()
}

/// Blank entries come from unchecked multi-select options; the stored animal
/// count reflects only real selections.
fn non_empty_ids(ids: &[String]) -> Vec<String> {
    ids.iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

// ── Handlers ─────────────────────────────────────────────────

/// GET /bookings — the caller's own bookings, animals resolved.
async fn list_bookings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<Vec<BookingWithAnimals>>> {
    let rows = fetch_with_animals(&state.pool, Some(&user.user_id)).await?;
    Ok(Json(rows))
}

/// POST /bookings — price and persist a new sitting request.
///
/// The quote is taken at creation time: the sale reference and total cost
/// stored here never change afterwards, whatever happens to the sale.
async fn create_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CreateBookingBody>,
) -> AppResult<(StatusCode, Json<BookingWithAnimals>)> {
    let pool = &state.pool;

    if body.booking_name.trim().is_empty() {
        return Err(AppError::BadRequest("booking_name is required".into()));
    }
    if body.phone.trim().is_empty() {
        return Err(AppError::BadRequest("phone is required".into()));
    }

    let selected = non_empty_ids(&body.selected_animal_ids);

    let active_sale = pricing::find_active_sale(pool).await?;
    let quote = pricing::quote(
        state.config.base_hourly_rate,
        body.duration_hours,
        active_sale.as_ref(),
    );

    let id = Uuid::new_v4().to_string();
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO bookings
            (id, user_id, booking_name, phone_number, date, start_time,
             duration_hours, total_cost, sale_applied, status, user_notes, num_animals)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 'pending', ?, ?)",
    )
    .bind(&id)
    .bind(&user.user_id)
    .bind(&body.booking_name)
    .bind(&body.phone)
    .bind(body.date)
    .bind(body.start_time)
    .bind(body.duration_hours)
    .bind(quote.total_cost)
    .bind(&quote.sale_id)
    .bind(&body.user_notes)
    .bind(selected.len() as i32)
    .execute(&mut *tx)
    .await?;

    for animal_id in &selected {
        sqlx::query("INSERT INTO booking_animals (id, booking_id, animal_id) VALUES (?, ?, ?)")
            .bind(Uuid::new_v4().to_string())
            .bind(&id)
            .bind(animal_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    let row = fetch_one_with_animals(pool, &id).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// DELETE /bookings/{id} — owner or administrator; completed bookings are
/// frozen and the request is rejected without deleting anything.
async fn delete_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let pool = &state.pool;

    #[derive(sqlx::FromRow)]
    struct OwnerStatusRow {
        user_id: String,
        status:  BookingStatus,
    }

    let row = sqlx::query_as::<_, OwnerStatusRow>(
        "SELECT user_id, status FROM bookings WHERE id = ? LIMIT 1",
    )
    .bind(&id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)?;

    if !user.is_admin && row.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }
    if !row.status.is_deletable() {
        return Err(AppError::BadRequest("Completed bookings cannot be deleted".into()));
    }

    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM booking_animals WHERE booking_id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM bookings WHERE id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_whitespace_ids_are_dropped() {
        let ids = vec![
            "a1".to_owned(),
            String::new(),
            "  ".to_owned(),
            "b2".to_owned(),
        ];
        let kept = non_empty_ids(&ids);
        assert_eq!(kept, vec!["a1".to_owned(), "b2".to_owned()]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn empty_selection_counts_zero_animals() {
        assert!(non_empty_ids(&[]).is_empty());
    }
}
