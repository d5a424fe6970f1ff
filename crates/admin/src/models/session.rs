//! Session-related types for admin authentication.

use serde::{Deserialize, Serialize};

use isra_cafe_core::{AdminUserId, Email};

use super::admin_user::AdminUser;

/// Session-stored admin identity.
///
/// Written only after the admin's password has been verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Admin's database ID.
    pub id: AdminUserId,
    /// Admin's email address.
    pub email: Email,
    /// Admin's display name.
    pub name: String,
}

impl From<&AdminUser> for CurrentAdmin {
    fn from(user: &AdminUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_shape() {
        let admin = CurrentAdmin {
            id: AdminUserId::new(3),
            email: Email::parse("owner@israscafe.in").unwrap(),
            name: "Isra".to_owned(),
        };
        let value = serde_json::to_value(&admin).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"id": 3, "email": "owner@israscafe.in", "name": "Isra"})
        );
    }
}
