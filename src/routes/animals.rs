//! `/animals` routes — CRUD for the caller's pet profiles.
//!
//! Every query filters on both id and owner, so another user's animal is
//! indistinguishable from a missing one.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    errors::{AppError, AppResult},
    middleware::auth_guard::AuthUser,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/animals",      get(list_animals).post(create_animal))
        .route("/animals/{id}", get(get_animal).put(update_animal).delete(delete_animal))
}

// ── Row / payload types ──────────────────────────────────────

#[derive(sqlx::FromRow, Serialize)]
struct AnimalRow {
    id:                 String,
    user_id:            String,
    name:               String,
    animal_type:        String,
    breed:              String,
    age:                Option<i32>,
    weight:             Option<f64>,
    temperament:        Option<String>,
    special_needs:      Option<String>,
    medical_conditions: Option<String>,
    created_at:         chrono::NaiveDateTime,
    updated_at:         chrono::NaiveDateTime,
}

#[derive(Deserialize)]
struct CreateAnimalBody {
    name:               String,
    animal_type:        String,
    breed:              String,
    age:                Option<i32>,
    weight:             Option<f64>,
    temperament:        Option<String>,
    special_needs:      Option<String>,
    medical_conditions: Option<String>,
}

#[derive(Deserialize)]
struct UpdateAnimalBody {
    name:               Option<String>,
    animal_type:        Option<String>,
    breed:              Option<String>,
    age:                Option<i32>,
    weight:             Option<f64>,
    temperament:        Option<String>,
    special_needs:      Option<String>,
    medical_conditions: Option<String>,
}

const SELECT_ANIMAL: &str =
    "SELECT id, user_id, name, animal_type, breed, age, weight, temperament,
            special_needs, medical_conditions, created_at, updated_at
     FROM animals";

// ── Ownership helper ──────────────────────────────────────────

/// Fetch an animal only when the caller owns it. Cross-user ids fall out as
/// `NotFound`.
async fn fetch_owned(pool: &crate::db::Db, id: &str, owner_id: &str) -> AppResult<AnimalRow> {
    sqlx::query_as::<_, AnimalRow>(&format!("{SELECT_ANIMAL} WHERE id = ? AND user_id = ?"))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)
}

// ── Handlers ─────────────────────────────────────────────────

async fn list_animals(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<Vec<AnimalRow>>> {
    let pool = &state.pool;
    let rows: Vec<AnimalRow> = sqlx::query_as::<_, AnimalRow>(&format!(
        "{SELECT_ANIMAL} WHERE user_id = ? ORDER BY name"
    ))
    .bind(&user.user_id)
    .fetch_all(pool)
    .await?;

    Ok(Json(rows))
}

async fn create_animal(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CreateAnimalBody>,
) -> AppResult<(StatusCode, Json<AnimalRow>)> {
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }
    if body.animal_type.trim().is_empty() {
        return Err(AppError::BadRequest("animal_type is required".into()));
    }
    let pool = &state.pool;

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO animals
            (id, user_id, name, animal_type, breed, age, weight, temperament,
             special_needs, medical_conditions)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&user.user_id)
    .bind(&body.name)
    .bind(&body.animal_type)
    .bind(&body.breed)
    .bind(body.age)
    .bind(body.weight)
    .bind(&body.temperament)
    .bind(&body.special_needs)
    .bind(&body.medical_conditions)
    .execute(pool)
    .await?;

    let row = fetch_owned(pool, &id, &user.user_id).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

async fn get_animal(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<Json<AnimalRow>> {
    let row = fetch_owned(&state.pool, &id, &user.user_id).await?;
    Ok(Json(row))
}

async fn update_animal(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<UpdateAnimalBody>,
) -> AppResult<Json<AnimalRow>> {
    let pool = &state.pool;
    fetch_owned(pool, &id, &user.user_id).await?;

    if let Some(name) = &body.name {
        sqlx::query("UPDATE animals SET name = ? WHERE id = ?")
            .bind(name).bind(&id).execute(pool).await?;
    }
    if let Some(animal_type) = &body.animal_type {
        sqlx::query("UPDATE animals SET animal_type = ? WHERE id = ?")
            .bind(animal_type).bind(&id).execute(pool).await?;
    }
    if let Some(breed) = &body.breed {
        sqlx::query("UPDATE animals SET breed = ? WHERE id = ?")
            .bind(breed).bind(&id).execute(pool).await?;
    }
    if let Some(age) = body.age {
        sqlx::query("UPDATE animals SET age = ? WHERE id = ?")
            .bind(age).bind(&id).execute(pool).await?;
    }
    if let Some(weight) = body.weight {
        sqlx::query("UPDATE animals SET weight = ? WHERE id = ?")
            .bind(weight).bind(&id).execute(pool).await?;
    }
    if let Some(temperament) = &body.temperament {
        sqlx::query("UPDATE animals SET temperament = ? WHERE id = ?")
            .bind(temperament).bind(&id).execute(pool).await?;
    }
    if let Some(needs) = &body.special_needs {
        sqlx::query("UPDATE animals SET special_needs = ? WHERE id = ?")
            .bind(needs).bind(&id).execute(pool).await?;
    }
    if let Some(medical) = &body.medical_conditions {
        sqlx::query("UPDATE animals SET medical_conditions = ? WHERE id = ?")
            .bind(medical).bind(&id).execute(pool).await?;
    }

    let row = fetch_owned(pool, &id, &user.user_id).await?;
    Ok(Json(row))
}

/// Deleting an animal removes its booking links first; the bookings
/// themselves stay.
async fn delete_animal(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let pool = &state.pool;
    fetch_owned(pool, &id, &user.user_id).await?;

    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM booking_animals WHERE animal_id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM animals WHERE id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
