//! Admin user domain types.

use chrono::{DateTime, Utc};

use isra_cafe_core::{AdminUserId, Email};

/// An admin user (domain type).
///
/// The password hash never leaves the repository layer.
#[derive(Debug, Clone)]
pub struct AdminUser {
    /// Unique admin user ID.
    pub id: AdminUserId,
    /// Admin's email address.
    pub email: Email,
    /// Admin's display name.
    pub name: String,
    /// When the admin was created.
    pub created_at: DateTime<Utc>,
}
