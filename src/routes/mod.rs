use axum::{middleware, Router};
use crate::{
    middleware::auth_guard::require_auth,
    state::AppState,
};

mod admin;
mod animals;
mod auth;
mod bookings;
pub mod health;
mod sales;

/// Build the full `/api/v1` router.
///
/// Registration, login and the public rate/sale endpoint are left
/// unprotected; every other route is wrapped in the session-based
/// [`require_auth`] middleware, and the `/admin` subtree additionally sits
/// behind the admin capability guard.
pub fn all_routes(state: AppState) -> Router<AppState> {
    let auth_mw = middleware::from_fn_with_state(state, require_auth);
    Router::new()
        .merge(auth::router())
        .merge(sales::public_router())  // public: home-page rate + active sale
        .merge(
            Router::new()
                .merge(animals::router())
                .merge(bookings::router())
                .merge(admin::router())
                .route_layer(auth_mw),
        )
}
