//! Database operations for the storefront.
//!
//! # Tables read or written here
//!
//! - `category`, `menu_item` - read-only menu
//! - `"order"`, `order_item` - orders created at checkout
//! - `tower_sessions.session` - customer sessions (managed by `tower-sessions`)
//!
//! # Migrations
//!
//! Migrations live in the workspace `migrations/` directory and run via:
//! ```bash
//! cargo run -p isra-cafe-cli -- migrate
//! ```

pub mod menu;
pub mod orders;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

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
