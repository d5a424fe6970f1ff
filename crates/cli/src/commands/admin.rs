//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! ADMIN_PASSWORD='a long passphrase' cafe-cli admin create -e admin@example.com -n "Admin Name"
//!
//! # or type the password on stdin
//! cafe-cli admin create -e admin@example.com -n "Admin Name"
//! ```

use std::io::BufRead;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use isra_cafe_admin::services::{AdminAuthError, AdminAuthService};

use super::{ConnectError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Password could not be read from stdin.
    #[error("Could not read password: {0}")]
    Stdin(#[from] std::io::Error),

    /// Validation or database failure.
    #[error("{0}")]
    Auth(#[from] AdminAuthError),
}

/// Read the password from `ADMIN_PASSWORD`, or the first line of stdin.
fn read_password() -> Result<SecretString, std::io::Error> {
    if let Ok(password) = std::env::var("ADMIN_PASSWORD") {
        return Ok(SecretString::from(password));
    }

    tracing::info!("Enter the admin password and press Enter:");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(SecretString::from(
        line.trim_end_matches(['\r', '\n']).to_owned(),
    ))
}

/// Create a new admin user.
///
/// # Errors
///
/// Returns `AdminError` if the input is invalid, the email is taken, or the
/// database is unreachable.
pub async fn create_user(email: &str, name: &str) -> Result<(), AdminError> {
    dotenvy::dotenv().ok();

    let password = read_password()?;
    let pool = connect().await?;

    let user = AdminAuthService::new(&pool)
        .create_admin(email, name, password.expose_secret())
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(())
}
