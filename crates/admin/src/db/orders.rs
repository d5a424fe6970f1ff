//! Order repository: listing, detail and status changes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use isra_cafe_core::{MenuItemId, Order, OrderId, OrderItem, OrderItemId, OrderStatus, TaxRate};

use super::RepositoryError;

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    customer_name: String,
    customer_mobile: String,
    subtotal: Decimal,
    tax_rate: Decimal,
    tax_amount: Decimal,
    total_amount: Decimal,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let tax_rate = TaxRate::new(row.tax_rate).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid tax rate on order {}: {e}", row.id))
        })?;

        Ok(Self {
            id: OrderId::from_uuid(row.id),
            customer_name: row.customer_name,
            customer_mobile: row.customer_mobile,
            subtotal: row.subtotal,
            tax_rate,
            tax_amount: row.tax_amount,
            total_amount: row.total_amount,
            status: row.status,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: Uuid,
    menu_item_id: Option<i32>,
    item_name: String,
    quantity: i32,
    price_per_item: Decimal,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "negative quantity {} on order item {}",
                row.quantity, row.id
            ))
        })?;

        Ok(Self {
            id: OrderItemId::new(row.id),
            order_id: OrderId::from_uuid(row.order_id),
            menu_item_id: row.menu_item_id.map(MenuItemId::new),
            item_name: row.item_name,
            quantity,
            price_per_item: row.price_per_item,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StatusCountRow {
    status: OrderStatus,
    count: i64,
}

/// Repository for order management.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, customer_name, customer_mobile, subtotal, tax_rate,
                   tax_amount, total_amount, status, created_at
            FROM "order"
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, customer_name, customer_mobile, subtotal, tax_rate,
                   tax_amount, total_amount, status, created_at
            FROM "order"
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    /// Line items of an order, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT id, order_id, menu_item_id, item_name, quantity, price_per_item
            FROM order_item
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(order_id.as_uuid())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderItem::try_from).collect()
    }

    /// Set an order's status. Any status may follow any other.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE "order"
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(status)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Number of orders in each status, in workflow order. Statuses without
    /// orders are reported as zero.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_status(&self) -> Result<Vec<(OrderStatus, i64)>, RepositoryError> {
        let rows = sqlx::query_as::<_, StatusCountRow>(
            r#"
            SELECT status, COUNT(*) AS count
            FROM "order"
            GROUP BY status
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(OrderStatus::ALL
            .into_iter()
            .map(|status| {
                let count = rows
                    .iter()
                    .find(|row| row.status == status)
                    .map_or(0, |row| row.count);
                (status, count)
            })
            .collect())
    }
}
