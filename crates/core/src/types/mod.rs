//! Core types for Isra's Cafe.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod customer;
pub mod email;
pub mod id;
pub mod menu;
pub mod order;
pub mod price;
pub mod status;

pub use customer::{CustomerError, CustomerName, Phone};
pub use email::{Email, EmailError};
pub use id::*;
pub use menu::{Category, CategoryWithItems, MenuItem, MenuItemError, MenuItemInput};
pub use order::{NewOrder, NewOrderError, NewOrderLine, Order, OrderItem};
pub use price::{CurrencyCode, Price};
pub use status::*;
