//! CLI subcommands.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Error shared by commands that need a database connection.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Neither database variable is set.
    #[error("Missing environment variable: ADMIN_DATABASE_URL (or DATABASE_URL)")]
    MissingDatabaseUrl,

    /// Connection failed.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect using `ADMIN_DATABASE_URL`, falling back to `DATABASE_URL`.
///
/// # Errors
///
/// Returns `ConnectError` if no URL is configured or the connection fails.
pub async fn connect() -> Result<PgPool, ConnectError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConnectError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to database...");
    Ok(isra_cafe_admin::db::create_pool(&database_url).await?)
}
