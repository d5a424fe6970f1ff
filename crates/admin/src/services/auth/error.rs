//! Admin authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during admin authentication operations.
#[derive(Debug, Error)]
pub enum AdminAuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] isra_cafe_core::EmailError),

    /// Unknown email or wrong password. The two are not distinguished.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Admin user already exists.
    #[error("admin user already exists")]
    UserAlreadyExists,

    /// Display name missing.
    #[error("name is required")]
    NameRequired,

    /// Password doesn't meet requirements.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
