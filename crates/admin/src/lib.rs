//! Isra's Cafe admin library.
//!
//! The staff dashboard: sign-in, order status management and menu editing
//! with image uploads. The router is assembled here so the binary and the
//! integration tests serve the same application.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, extract::DefaultBodyLimit, extract::State, http::StatusCode, routing::get};
use tower_http::services::ServeDir;
use tower_sessions::{SessionManagerLayer, SessionStore};

use state::AppState;

/// Directory the stylesheet is served from, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/admin/static";

/// Room for the text fields of a menu item form on top of the image.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the admin application.
///
/// Tracing and Sentry layers are left to the caller.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    let media = ServeDir::new(&state.config().media_dir);
    let body_limit = state.config().max_image_bytes + FORM_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .nest_service("/media", media)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
