//! Session middleware configuration for admin.
//!
//! Admin sessions live in their own table, separate from storefront
//! sessions, and use stricter cookie settings (SameSite=Strict, 8 hour
//! inactivity expiry).

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AdminConfig;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "isra_cafe_admin_session";

/// Table admin sessions are stored in.
pub const SESSION_TABLE: &str = "admin_session";

/// Session expiry time in seconds (8 hours of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 8 * 60 * 60;

/// The `PostgreSQL` session store for admin sessions.
///
/// The table is created by `cafe-cli migrate`.
///
/// # Panics
///
/// Panics if the table name is invalid (never happens with the constant
/// [`SESSION_TABLE`]).
#[must_use]
pub fn session_store(pool: &PgPool) -> PostgresStore {
    PostgresStore::new(pool.clone())
        .with_table_name(SESSION_TABLE)
        .expect("valid table name")
}

/// Create the session layer with the `PostgreSQL` store.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &AdminConfig,
) -> SessionManagerLayer<PostgresStore> {
    session_layer(session_store(pool), config)
}

/// Apply the admin cookie policy to any session store.
#[must_use]
pub fn session_layer<S: SessionStore + Clone>(
    store: S,
    config: &AdminConfig,
) -> SessionManagerLayer<S> {
    // Secure cookies only when served over HTTPS
    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
