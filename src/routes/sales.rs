//! Public pricing surface: the base hourly rate and the sale currently
//! applied to new bookings. This is the data behind the home page.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::{errors::AppResult, services::pricing, state::AppState};

pub fn public_router() -> Router<AppState> {
    Router::new().route("/sales/active", get(active_sale))
}

#[derive(sqlx::FromRow, Serialize)]
struct SaleRow {
    id:                  String,
    name:                String,
    discount_percentage: f64,
    is_active:           bool,
    color:               String,
}

#[derive(Serialize)]
struct RateResponse {
    base_hourly_rate: f64,
    active_sale:      Option<SaleRow>,
}

/// GET /sales/active — no auth; shown to visitors before they book.
async fn active_sale(State(state): State<AppState>) -> AppResult<Json<RateResponse>> {
    let pool = &state.pool;

    // Same selection rule the booking engine uses, so the advertised sale is
    // the one that will actually be applied.
    let sale = match pricing::find_active_sale(pool).await? {
        Some(active) => {
            sqlx::query_as::<_, SaleRow>(
                "SELECT id, name, discount_percentage, is_active, color
                 FROM sales WHERE id = ?",
            )
            .bind(&active.id)
            .fetch_optional(pool)
            .await?
        }
        None => None,
    };

    Ok(Json(RateResponse {
        base_hourly_rate: state.config.base_hourly_rate,
        active_sale:      sale,
    }))
}
