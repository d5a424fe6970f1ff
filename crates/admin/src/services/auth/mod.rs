//! Admin authentication service.
//!
//! Admins sign in with email and password. Passwords are stored as Argon2id
//! PHC strings; accounts are created from the CLI, never from the web.

mod error;

pub use error::AdminAuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use isra_cafe_core::Email;

use crate::db::{AdminUserRepository, RepositoryError};
use crate::models::AdminUser;

/// Minimum password length for admin accounts.
pub const MIN_PASSWORD_LENGTH: usize = 12;

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    users: AdminUserRepository<'a>,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: AdminUserRepository::new(pool),
        }
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidEmail` if the email is malformed.
    /// Returns `AdminAuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<AdminUser, AdminAuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AdminAuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Create an admin account.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidEmail`, `NameRequired` or `WeakPassword`
    /// for bad input, and `AdminAuthError::UserAlreadyExists` if the email is
    /// taken.
    pub async fn create_admin(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<AdminUser, AdminAuthError> {
        let email = Email::parse(email)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(AdminAuthError::NameRequired);
        }
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        self.users
            .create(&email, name, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AdminAuthError::UserAlreadyExists,
                other => AdminAuthError::Repository(other),
            })
    }
}

/// Validate password strength.
fn validate_password(password: &str) -> Result<(), AdminAuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AdminAuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AdminAuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AdminAuthError::PasswordHash)
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AdminAuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AdminAuthError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AdminAuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse battery", &hash).is_ok());
    }

    #[test]
    fn test_wrong_password_is_invalid_credentials() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(matches!(
            verify_password("wrong horse battery", &hash),
            Err(AdminAuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AdminAuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_short_password_rejected() {
        assert!(matches!(
            validate_password("short"),
            Err(AdminAuthError::WeakPassword(_))
        ));
        assert!(validate_password("twelve chars").is_ok());
    }
}
