//! Admin user repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use isra_cafe_core::{AdminUserId, Email};

use super::RepositoryError;
use crate::models::AdminUser;

/// Internal row type for `PostgreSQL` admin user queries.
#[derive(Debug, sqlx::FromRow)]
struct AdminUserRow {
    id: i32,
    email: String,
    name: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AdminUserRow> for AdminUser {
    type Error = RepositoryError;

    fn try_from(row: AdminUserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: AdminUserId::new(row.id),
            email,
            name: row.name,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AdminUserWithHashRow {
    #[sqlx(flatten)]
    user: AdminUserRow,
    password_hash: String,
}

/// Repository for admin user database operations.
pub struct AdminUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminUserRepository<'a> {
    /// Create a new admin user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an admin user together with their password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(AdminUser, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserWithHashRow>(
            r"
            SELECT id, email, name, created_at, password_hash
            FROM admin_user
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(|row| Ok((AdminUser::try_from(row.user)?, row.password_hash)))
            .transpose()
    }

    /// Create an admin user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    /// Returns `RepositoryError::Database` if the insert fails otherwise.
    pub async fn create(
        &self,
        email: &Email,
        name: &str,
        password_hash: &str,
    ) -> Result<AdminUser, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(
            r"
            INSERT INTO admin_user (email, name, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, name, created_at
            ",
        )
        .bind(email.as_str())
        .bind(name)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "admin user"))?;

        row.try_into()
    }
}
