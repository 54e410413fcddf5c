use std::net::SocketAddr;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod auth;
mod config;
mod db;
mod errors;
mod middleware;
mod models;
mod routes;
mod services;
mod state;

use config::BootstrapAdmin;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ───────────────────────────────────────────────
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── Config ────────────────────────────────────────────────
    let config = config::Config::from_env()?;
    tracing::info!(env = %config.app_env, "Starting petsitter backend");

    // ── Database ──────────────────────────────────────────────
    let pool = db::connect(&config).await?;

    // Bootstrap is idempotent across re-deploys; a partial failure here must
    // not stop the process from serving.
    if let Err(err) = db::run_migrations(&pool).await {
        tracing::warn!(error = ?err, "Migrations failed, continuing with the existing schema");
    }

    // ── Bootstrap admin (file-defined, outside the user store) ─
    match BootstrapAdmin::load(&config.bootstrap_admin_path) {
        Ok(bootstrap) => {
            if let Err(err) = auth::seed::seed_accounts(&pool, bootstrap.as_ref()).await {
                tracing::warn!(error = ?err, "Failed to seed bootstrap admin");
            }
        }
        Err(err) => {
            tracing::warn!(error = ?err, "Failed to load bootstrap admin file");
        }
    }

    let app_state = AppState { pool, config };

    // Read address before moving config into state
    let addr: SocketAddr = format!(
        "{}:{}",
        app_state.config.backend_host,
        app_state.config.backend_port
    )
    .parse()?;

    // ── Router ────────────────────────────────────────────────
    let app = Router::new()
        .nest("/api/v1", routes::all_routes(app_state.clone()))
        .route("/health", get(routes::health::health_check))
        .layer(CookieManagerLayer::new())   // must come before state
        .layer(CorsLayer::permissive())     // tighten in production
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);
    tracing::info!(%addr, "Listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
