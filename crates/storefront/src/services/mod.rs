//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `cart` - Session-backed cart persistence
//! - `menu` - Cached menu reads

pub mod cart;
pub mod menu;

pub use cart::{SessionSnapshots, load_cart};
pub use menu::MenuCatalog;
