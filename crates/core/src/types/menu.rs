//! Menu domain types and the validated admin input for menu items.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CategoryId, MenuItemId};

/// A menu category, e.g. "Beverages".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Display order, ascending.
    pub position: i32,
}

/// A purchasable menu item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub category_id: CategoryId,
    pub name: String,
    pub price: Decimal,
    /// Object key of the item image in the media store.
    pub image_key: Option<String>,
    /// Display order within the category, ascending.
    pub position: i32,
    pub is_available: bool,
}

/// A category together with its items, both ordered by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryWithItems {
    pub category: Category,
    pub items: Vec<MenuItem>,
}

impl CategoryWithItems {
    /// Attach items to their categories.
    ///
    /// Categories and items keep their input order, so callers pass both
    /// already sorted by position. Items whose category is not in
    /// `categories` are dropped.
    #[must_use]
    pub fn group(categories: Vec<Category>, items: Vec<MenuItem>) -> Vec<Self> {
        let mut grouped: Vec<Self> = categories
            .into_iter()
            .map(|category| Self {
                category,
                items: Vec::new(),
            })
            .collect();

        for item in items {
            if let Some(group) = grouped
                .iter_mut()
                .find(|group| group.category.id == item.category_id)
            {
                group.items.push(item);
            }
        }
        grouped
    }
}

/// Validation failures for [`MenuItemInput`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MenuItemError {
    #[error("Name is required")]
    NameRequired,
    #[error("Name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("Price is required")]
    PriceRequired,
    #[error("Price must be a non-negative amount with up to 2 decimal places")]
    InvalidPrice,
    #[error("Category is required")]
    CategoryRequired,
    #[error("Position must be an integer")]
    InvalidPosition,
}

/// Validated fields for creating or updating a menu item.
///
/// Built from raw form strings at the HTTP boundary; nothing reaches the
/// database without passing through [`MenuItemInput::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItemInput {
    pub name: String,
    pub price: Decimal,
    pub category_id: CategoryId,
    pub position: i32,
    pub is_available: bool,
}

impl MenuItemInput {
    /// Maximum item name length.
    pub const MAX_NAME_LENGTH: usize = 120;

    /// Validate raw form values.
    ///
    /// # Errors
    ///
    /// Returns the first [`MenuItemError`] encountered, checking name, price,
    /// category and position in that order.
    pub fn parse(
        name: &str,
        price: &str,
        category_id: &str,
        position: &str,
        is_available: bool,
    ) -> Result<Self, MenuItemError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MenuItemError::NameRequired);
        }
        if name.chars().count() > Self::MAX_NAME_LENGTH {
            return Err(MenuItemError::NameTooLong {
                max: Self::MAX_NAME_LENGTH,
            });
        }

        let price = parse_price(price)?;

        let category_id = category_id.trim();
        if category_id.is_empty() {
            return Err(MenuItemError::CategoryRequired);
        }
        let category_id =
            CategoryId::from_str(category_id).map_err(|_| MenuItemError::CategoryRequired)?;

        let position = position
            .trim()
            .parse::<i32>()
            .map_err(|_| MenuItemError::InvalidPosition)?;

        Ok(Self {
            name: name.to_owned(),
            price,
            category_id,
            position,
            is_available,
        })
    }
}

/// Accepts `123` or `123.4` or `123.45`; nothing else.
fn parse_price(raw: &str) -> Result<Decimal, MenuItemError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(MenuItemError::PriceRequired);
    }

    let (whole, fraction) = match raw.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (raw, None),
    };
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    let fraction_ok = fraction.is_none_or(|f| digits(f) && f.len() <= 2);
    if !digits(whole) || !fraction_ok {
        return Err(MenuItemError::InvalidPrice);
    }

    Decimal::from_str(raw).map_err(|_| MenuItemError::InvalidPrice)
}
