//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Email and password authentication with Argon2id
//! - `media` - Menu item image storage under `MEDIA_DIR`

pub mod auth;
pub mod media;

pub use auth::{AdminAuthError, AdminAuthService};
pub use media::{MediaError, MediaStore};
