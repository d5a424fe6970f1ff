//! Orders and their line items.
//!
//! Line items snapshot the item name and unit price at purchase time, so an
//! order keeps rendering the same invoice after the menu changes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::customer::{CustomerName, Phone};
use super::id::{MenuItemId, OrderId, OrderItemId};
use super::menu::MenuItem;
use super::price::Price;
use super::status::OrderStatus;
use crate::cart::Cart;
use crate::pricing::{OrderTotals, PricedLine, TaxRate};

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    pub customer_mobile: String,
    pub subtotal: Decimal,
    /// Rate the order was priced at.
    pub tax_rate: TaxRate,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Stored totals, at the order's own tax rate.
    #[must_use]
    pub const fn totals(&self) -> OrderTotals {
        OrderTotals {
            subtotal: self.subtotal,
            tax_rate: self.tax_rate,
            tax: self.tax_amount,
            total: self.total_amount,
        }
    }
}

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    /// `None` once the menu item has been deleted.
    pub menu_item_id: Option<MenuItemId>,
    pub item_name: String,
    pub quantity: u32,
    pub price_per_item: Decimal,
}

impl OrderItem {
    #[must_use]
    pub fn line_total_display(&self) -> String {
        Price::inr(self.line_total()).display()
    }
}

impl PricedLine for OrderItem {
    fn unit_price(&self) -> Decimal {
        self.price_per_item
    }

    fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// Why a cart could not be turned into an order.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NewOrderError {
    #[error("Your cart is empty")]
    EmptyCart,
    #[error("{0} is no longer available")]
    ItemUnavailable(String),
}

/// A line of an order about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderLine {
    pub menu_item_id: MenuItemId,
    pub item_name: String,
    pub quantity: u32,
    pub price_per_item: Decimal,
}

impl PricedLine for NewOrderLine {
    fn unit_price(&self) -> Decimal {
        self.price_per_item
    }

    fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// A validated order ready to be persisted with status
/// [`OrderStatus::PaymentPending`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_name: CustomerName,
    pub customer_mobile: Phone,
    pub lines: Vec<NewOrderLine>,
    pub totals: OrderTotals,
}

impl NewOrder {
    /// Build an order from a cart, pricing every line from `live_items`
    /// rather than from the prices cached in the cart.
    ///
    /// # Errors
    ///
    /// Returns [`NewOrderError::EmptyCart`] for an empty cart and
    /// [`NewOrderError::ItemUnavailable`] when a cart line no longer matches
    /// an available menu item.
    pub fn from_cart(
        customer_name: CustomerName,
        customer_mobile: Phone,
        cart: &Cart,
        live_items: &[MenuItem],
        tax_rate: TaxRate,
    ) -> Result<Self, NewOrderError> {
        if cart.is_empty() {
            return Err(NewOrderError::EmptyCart);
        }

        let lines = cart
            .lines()
            .map(|line| {
                live_items
                    .iter()
                    .find(|item| item.id == line.item_id && item.is_available)
                    .map(|item| NewOrderLine {
                        menu_item_id: item.id,
                        item_name: item.name.clone(),
                        quantity: line.quantity,
                        price_per_item: item.price,
                    })
                    .ok_or_else(|| NewOrderError::ItemUnavailable(line.name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let totals = OrderTotals::compute(&lines, tax_rate);

        Ok(Self {
            customer_name,
            customer_mobile,
            lines,
            totals,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::CategoryId;

    fn item(id: i32, name: &str, price: i64, is_available: bool) -> MenuItem {
        MenuItem {
            id: MenuItemId::new(id),
            category_id: CategoryId::new(1),
            name: name.to_owned(),
            price: Decimal::new(price, 0),
            image_key: None,
            position: id,
            is_available,
        }
    }

    fn customer() -> (CustomerName, Phone) {
        (
            CustomerName::parse("Isra").unwrap(),
            Phone::parse("9876543210").unwrap(),
        )
    }

    fn five_percent() -> TaxRate {
        TaxRate::from_percent(Decimal::new(5, 0)).unwrap()
    }

    #[test]
    fn test_from_cart_uses_live_prices() {
        let chai = item(1, "Chai", 20, true);
        let mut cart = Cart::default();
        cart.add_item(&chai);
        cart.add_item(&chai);

        let repriced = item(1, "Masala Chai", 25, true);
        let (name, phone) = customer();
        let order = NewOrder::from_cart(name, phone, &cart, &[repriced], five_percent()).unwrap();

        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].item_name, "Masala Chai");
        assert_eq!(order.lines[0].quantity, 2);
        assert_eq!(order.totals.subtotal, Decimal::new(50, 0));
        assert_eq!(order.totals.total_display(), "₹52.50");
    }

    #[test]
    fn test_from_cart_rejects_empty_cart() {
        let (name, phone) = customer();
        let result = NewOrder::from_cart(name, phone, &Cart::default(), &[], five_percent());
        assert_eq!(result, Err(NewOrderError::EmptyCart));
    }

    #[test]
    fn test_from_cart_rejects_unavailable_and_missing_items() {
        let samosa = item(2, "Samosa", 15, true);
        let mut cart = Cart::default();
        cart.add_item(&samosa);

        let (name, phone) = customer();
        let sold_out = item(2, "Samosa", 15, false);
        let result = NewOrder::from_cart(name.clone(), phone.clone(), &cart, &[sold_out], five_percent());
        assert_eq!(result, Err(NewOrderError::ItemUnavailable("Samosa".to_owned())));

        let result = NewOrder::from_cart(name, phone, &cart, &[], five_percent());
        assert!(matches!(result, Err(NewOrderError::ItemUnavailable(_))));
    }

    #[test]
    fn test_order_totals_use_stored_rate() {
        let rate = TaxRate::new(Decimal::new(18, 2)).unwrap();
        let order = Order {
            id: OrderId::generate(),
            customer_name: "Isra".to_owned(),
            customer_mobile: "9876543210".to_owned(),
            subtotal: Decimal::new(200, 0),
            tax_rate: rate,
            tax_amount: Decimal::new(36, 0),
            total_amount: Decimal::new(236, 0),
            status: OrderStatus::PaymentPending,
            created_at: Utc::now(),
        };
        let totals = order.totals();
        assert_eq!(totals.tax_label(), "GST (18%)");
        assert_eq!(totals.total_display(), "₹236.00");
    }

    #[test]
    fn test_order_item_line_total() {
        let line = OrderItem {
            id: OrderItemId::new(1),
            order_id: OrderId::generate(),
            menu_item_id: None,
            item_name: "Lassi".to_owned(),
            quantity: 3,
            price_per_item: Decimal::new(4550, 2),
        };
        assert_eq!(line.line_total_display(), "₹136.50");
    }
}
