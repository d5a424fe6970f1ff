//! Session-related types.
//!
//! Types stored in the customer's server-side session.

use serde::{Deserialize, Serialize};

use isra_cafe_core::{CustomerError, CustomerName, Phone};

/// Session-stored customer identity.
///
/// Self-asserted at the login form; validated for shape only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentCustomer {
    pub name: CustomerName,
    pub phone: Phone,
}

impl CurrentCustomer {
    /// Validate the raw login form fields.
    ///
    /// # Errors
    ///
    /// Returns the first [`CustomerError`] found, name before phone.
    pub fn from_login(name: &str, phone: &str) -> Result<Self, CustomerError> {
        Ok(Self {
            name: CustomerName::parse(name)?,
            phone: Phone::parse(phone)?,
        })
    }
}

/// Session keys for customer data.
pub mod keys {
    /// Key for storing the current customer.
    pub const CURRENT_CUSTOMER: &str = "current_customer";
}
