//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a customer order.
///
/// Orders start as [`OrderStatus::PaymentPending`] when the customer checks
/// out. Admins move them through the kitchen workflow by hand; any status can
/// be set from any other, including reopening a cancelled order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    PaymentPending,
    OrderPlaced,
    OrderInPreparation,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Every status, in workflow order.
    pub const ALL: [Self; 5] = [
        Self::PaymentPending,
        Self::OrderPlaced,
        Self::OrderInPreparation,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Wire/database representation, e.g. `ORDER_PLACED`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PaymentPending => "PAYMENT_PENDING",
            Self::OrderPlaced => "ORDER_PLACED",
            Self::OrderInPreparation => "ORDER_IN_PREPARATION",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Human-readable label for dashboards.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::PaymentPending => "Payment pending",
            Self::OrderPlaced => "Order placed",
            Self::OrderInPreparation => "In preparation",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Whether the order still needs kitchen attention.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::OrderPlaced | Self::OrderInPreparation)
    }

    /// Status once the payment gateway reports success. Only a pending
    /// order moves; anything an admin already set is kept.
    #[must_use]
    pub const fn after_payment(self) -> Self {
        match self {
            Self::PaymentPending => Self::OrderPlaced,
            other => other,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_round_trips_every_status() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_cancelled_is_distinct_from_completed() {
        assert_eq!(
            "CANCELLED".parse::<OrderStatus>().unwrap(),
            OrderStatus::Cancelled
        );
        assert_ne!(OrderStatus::Cancelled.as_str(), OrderStatus::Completed.as_str());
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("cancelled".parse::<OrderStatus>().is_err());
        assert!("SHIPPED".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&OrderStatus::OrderInPreparation).unwrap();
        assert_eq!(json, "\"ORDER_IN_PREPARATION\"");
    }

    #[test]
    fn test_default_is_payment_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::PaymentPending);
        assert!(!OrderStatus::PaymentPending.is_open());
        assert!(OrderStatus::OrderInPreparation.is_open());
    }

    #[test]
    fn test_after_payment_only_moves_pending_orders() {
        assert_eq!(
            OrderStatus::PaymentPending.after_payment(),
            OrderStatus::OrderPlaced
        );
        // Returning to the invoice page again changes nothing
        assert_eq!(
            OrderStatus::OrderPlaced.after_payment(),
            OrderStatus::OrderPlaced
        );
        assert_eq!(
            OrderStatus::Cancelled.after_payment(),
            OrderStatus::Cancelled
        );
        assert_eq!(
            OrderStatus::Completed.after_payment(),
            OrderStatus::Completed
        );
    }
}
