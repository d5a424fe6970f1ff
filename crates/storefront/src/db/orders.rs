//! Order repository: creation at checkout and invoice reads.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use isra_cafe_core::{
    MenuItemId, NewOrder, Order, OrderId, OrderItem, OrderItemId, OrderStatus, TaxRate,
};

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

/// Repository for storefront order operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order and its lines in one transaction.
    ///
    /// The order starts as [`OrderStatus::PaymentPending`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails; nothing is
    /// written in that case.
    pub async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let id = OrderId::generate();
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            INSERT INTO "order"
                (id, customer_name, customer_mobile, subtotal, tax_rate, tax_amount, total_amount, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, customer_name, customer_mobile, subtotal, tax_rate,
                      tax_amount, total_amount, status, created_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(order.customer_name.as_str())
        .bind(order.customer_mobile.as_str())
        .bind(order.totals.subtotal)
        .bind(order.totals.tax_rate.as_decimal())
        .bind(order.totals.tax)
        .bind(order.totals.total)
        .bind(OrderStatus::PaymentPending)
        .fetch_one(&mut *tx)
        .await?;

        for line in &order.lines {
            let quantity = i32::try_from(line.quantity).map_err(|_| {
                RepositoryError::DataCorruption(format!("quantity {} out of range", line.quantity))
            })?;

            sqlx::query(
                r"
                INSERT INTO order_item (order_id, menu_item_id, item_name, quantity, price_per_item)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(id.as_uuid())
            .bind(line.menu_item_id.as_i32())
            .bind(&line.item_name)
            .bind(quantity)
            .bind(line.price_per_item)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Order::try_from(row)
    }

    /// Get an order by id.
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

    /// Move a paid order from `PAYMENT_PENDING` to `ORDER_PLACED`.
    ///
    /// Orders in any other status are left alone, so repeated calls are
    /// harmless. Returns whether a row changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_placed(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE "order"
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(OrderStatus::PaymentPending)
        .bind(OrderStatus::PaymentPending.after_payment())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
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
}
