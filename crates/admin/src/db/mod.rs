//! Database operations for the admin panel.
//!
//! The admin panel shares the cafe database with the storefront. It is the
//! only writer of `category`, `menu_item` and `admin_user`, and the only place
//! order statuses change.
//!
//! # Migrations
//!
//! Migrations live in the workspace `migrations/` directory and run via:
//! ```bash
//! cargo run -p isra-cafe-cli -- migrate
//! ```

pub mod admin_users;
pub mod menu;
pub mod orders;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use admin_users::AdminUserRepository;
pub use menu::MenuRepository;
pub use orders::OrderRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map unique and foreign key violations to [`RepositoryError::Conflict`].
    fn from_write(error: sqlx::Error, what: &str) -> Self {
        match &error {
            sqlx::Error::Database(db)
                if db.is_unique_violation() || db.is_foreign_key_violation() =>
            {
                Self::Conflict(format!("{what}: {}", db.message()))
            }
            _ => Self::Database(error),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
