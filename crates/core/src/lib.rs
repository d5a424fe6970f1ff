//! Isra's Cafe Core - Shared types library.
//!
//! This crate provides common types used across all Isra's Cafe components:
//! - `storefront` - Customer-facing menu, cart and checkout
//! - `admin` - Menu and order management dashboard
//! - `cli` - Command-line tools for migrations, seeding and admin users
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no database access, no
//! HTTP clients. Persistence is expressed as the [`SnapshotStore`] port, which
//! the binaries implement over their session store.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, prices, emails, phones, statuses and domain records
//! - [`cart`] - The shopping cart state machine and its persisted store
//! - [`pricing`] - Subtotal, GST and total computation
//! - [`snapshot`] - The load/save persistence port

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod pricing;
pub mod snapshot;
pub mod types;

pub use cart::{Cart, CartLine, CartStore};
pub use pricing::{OrderTotals, PricedLine, TaxRate, TaxRateError};
pub use snapshot::{MemorySnapshotStore, SnapshotStore};
pub use types::*;
