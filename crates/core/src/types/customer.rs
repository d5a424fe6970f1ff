//! Self-asserted customer identity captured by the storefront login form.
//!
//! Customers are not authenticated. The name and phone number are only
//! validated for shape so that orders carry usable contact details.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors produced while validating customer details.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CustomerError {
    /// Name shorter than [`CustomerName::MIN_LENGTH`] characters.
    #[error("Name must be at least 2 characters")]
    NameTooShort,
    /// Name longer than [`CustomerName::MAX_LENGTH`] characters.
    #[error("Name must be at most 80 characters")]
    NameTooLong,
    /// Phone number is not a 10-digit mobile number starting with 6-9.
    #[error("Enter a valid phone number")]
    InvalidPhone,
}

/// Customer display name, trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerName(String);

impl CustomerName {
    /// Minimum number of characters.
    pub const MIN_LENGTH: usize = 2;
    /// Maximum number of characters.
    pub const MAX_LENGTH: usize = 80;

    /// Validate a customer name.
    ///
    /// # Errors
    ///
    /// Returns [`CustomerError::NameTooShort`] or [`CustomerError::NameTooLong`]
    /// when the trimmed name is outside the allowed length.
    pub fn parse(s: &str) -> Result<Self, CustomerError> {
        let trimmed = s.trim();
        let len = trimmed.chars().count();
        if len < Self::MIN_LENGTH {
            return Err(CustomerError::NameTooShort);
        }
        if len > Self::MAX_LENGTH {
            return Err(CustomerError::NameTooLong);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Indian mobile number: exactly ten digits, the first one 6-9.
///
/// ```
/// use isra_cafe_core::Phone;
///
/// assert!(Phone::parse("9876543210").is_ok());
/// assert!(Phone::parse("1234567890").is_err());
/// assert!(Phone::parse("98765").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Number of digits in a mobile number.
    pub const DIGITS: usize = 10;

    /// Validate a phone number. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CustomerError::InvalidPhone`] if the input is not ten ASCII
    /// digits starting with 6, 7, 8 or 9.
    pub fn parse(s: &str) -> Result<Self, CustomerError> {
        let s = s.trim();
        let bytes = s.as_bytes();
        let valid = bytes.len() == Self::DIGITS
            && matches!(bytes.first(), Some(b'6'..=b'9'))
            && bytes.iter().all(u8::is_ascii_digit);

        if valid {
            Ok(Self(s.to_owned()))
        } else {
            Err(CustomerError::InvalidPhone)
        }
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_trimmed() {
        let name = CustomerName::parse("  Isra ").unwrap();
        assert_eq!(name.as_str(), "Isra");
    }

    #[test]
    fn test_name_length_bounds() {
        assert_eq!(CustomerName::parse(" a "), Err(CustomerError::NameTooShort));
        assert!(CustomerName::parse("Al").is_ok());
        assert_eq!(
            CustomerName::parse(&"x".repeat(81)),
            Err(CustomerError::NameTooLong)
        );
    }

    #[test]
    fn test_name_counts_characters_not_bytes() {
        // Two Devanagari characters, six bytes
        assert!(CustomerName::parse("रम").is_ok());
    }

    #[test]
    fn test_phone_accepts_mobile_numbers() {
        for valid in ["6000000000", "7123456789", "8999999999", " 9876543210 "] {
            assert!(Phone::parse(valid).is_ok(), "{valid} should be accepted");
        }
    }

    #[test]
    fn test_phone_rejects_invalid_numbers() {
        for invalid in ["", "5876543210", "987654321", "98765432101", "98765x3210", "+919876543210"] {
            assert_eq!(Phone::parse(invalid), Err(CustomerError::InvalidPhone), "{invalid}");
        }
    }
}
