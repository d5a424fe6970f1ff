//! Database migration command.
//!
//! Applies the workspace `migrations/` directory, then creates the session
//! tables used by the storefront and admin session stores.

use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

use super::{ConnectError, connect};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the connection or any migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running schema migrations...");
    sqlx::migrate!("../../migrations").run(&pool).await?;

    tracing::info!("Creating storefront session table...");
    PostgresStore::new(pool.clone()).migrate().await?;

    tracing::info!("Creating admin session table...");
    isra_cafe_admin::middleware::session_store(&pool)
        .migrate()
        .await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
