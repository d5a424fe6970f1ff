//! Order management route handlers.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use isra_cafe_core::{Order, OrderId, OrderItem, OrderStatus, OrderTotals, Price};

use super::{AdminView, MessageQuery, redirect_with_error, redirect_with_success, render};
use crate::db::{OrderRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Timestamp format used across order pages.
const DATE_FORMAT: &str = "%d %b %Y, %H:%M UTC";

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(index))
        .route("/orders/{id}", get(show))
        .route("/orders/{id}/status", post(update_status))
}

/// One row of the orders table.
#[derive(Debug, Clone)]
pub struct OrderRowView {
    pub id: String,
    pub short_id: String,
    pub customer_name: String,
    pub customer_mobile: String,
    pub total: String,
    pub status: String,
    pub status_label: String,
    pub created_at: String,
}

impl From<&Order> for OrderRowView {
    fn from(order: &Order) -> Self {
        let id = order.id.to_string();
        Self {
            short_id: id.chars().take(8).collect(),
            id,
            customer_name: order.customer_name.clone(),
            customer_mobile: order.customer_mobile.clone(),
            total: Price::inr(order.total_amount).display(),
            status: order.status.as_str().to_owned(),
            status_label: order.status.label().to_owned(),
            created_at: order.created_at.format(DATE_FORMAT).to_string(),
        }
    }
}

/// One line on the order detail page.
#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&OrderItem> for OrderLineView {
    fn from(item: &OrderItem) -> Self {
        Self {
            name: item.item_name.clone(),
            quantity: item.quantity,
            unit_price: Price::inr(item.price_per_item).display(),
            line_total: item.line_total_display(),
        }
    }
}

/// Option in the status dropdown.
#[derive(Debug, Clone)]
pub struct StatusOptionView {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Status dropdown options, every status in workflow order.
#[must_use]
pub fn status_options(current: OrderStatus) -> Vec<StatusOptionView> {
    OrderStatus::ALL
        .into_iter()
        .map(|status| StatusOptionView {
            value: status.as_str(),
            label: status.label(),
            selected: status == current,
        })
        .collect()
}

/// Orders list template.
#[derive(Template)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub admin_user: AdminView,
    pub current_path: String,
    pub orders: Vec<OrderRowView>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Order detail template.
#[derive(Template)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub admin_user: AdminView,
    pub current_path: String,
    pub order: OrderRowView,
    pub lines: Vec<OrderLineView>,
    pub subtotal: String,
    pub tax_label: String,
    pub tax: String,
    pub total: String,
    pub status_options: Vec<StatusOptionView>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Status change form.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// All orders, newest first.
///
/// GET /orders
#[instrument(skip(admin, state))]
async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
) -> Response {
    let mut error = query.error;

    let orders = match OrderRepository::new(state.pool()).list().await {
        Ok(orders) => orders.iter().map(OrderRowView::from).collect(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list orders");
            error = Some("Orders are unavailable right now".to_owned());
            Vec::new()
        }
    };

    render(&OrdersIndexTemplate {
        admin_user: AdminView::from(&admin),
        current_path: "/orders".to_owned(),
        orders,
        error,
        success: query.success,
    })
}

/// Order detail with line items.
///
/// Totals are recomputed from the lines at the rate stored on the order.
///
/// GET /orders/{id}
#[instrument(skip(admin, state))]
async fn show(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<MessageQuery>,
) -> Result<Response> {
    let order_id: OrderId = id
        .parse()
        .map_err(|_| AppError::NotFound(format!("order {id}")))?;

    let repo = OrderRepository::new(state.pool());
    let order = repo
        .get(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;
    let items = repo.items(order_id).await?;

    let totals = OrderTotals::compute(&items, order.tax_rate);
    if totals.total.round_dp(2) != order.total_amount.round_dp(2) {
        tracing::warn!(
            order_id = %order_id,
            stored = %order.total_amount,
            computed = %totals.total,
            "Order lines do not add up to the stored total"
        );
    }

    Ok(render(&OrderShowTemplate {
        admin_user: AdminView::from(&admin),
        current_path: "/orders".to_owned(),
        order: OrderRowView::from(&order),
        lines: items.iter().map(OrderLineView::from).collect(),
        subtotal: totals.subtotal_display(),
        tax_label: totals.tax_label(),
        tax: totals.tax_display(),
        total: totals.total_display(),
        status_options: status_options(order.status),
        error: query.error,
        success: query.success,
    }))
}

/// Change an order's status. Any status may follow any other.
///
/// POST /orders/{id}/status
#[instrument(skip(admin, state))]
async fn update_status(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    let order_id: OrderId = id
        .parse()
        .map_err(|_| AppError::NotFound(format!("order {id}")))?;
    let detail_path = format!("/orders/{order_id}");

    let Ok(status) = form.status.parse::<OrderStatus>() else {
        return Ok(redirect_with_error(&detail_path, "Unknown order status").into_response());
    };

    match OrderRepository::new(state.pool())
        .update_status(order_id, status)
        .await
    {
        Ok(()) => {
            tracing::info!(
                order_id = %order_id,
                status = %status,
                admin_id = %admin.id,
                "Order status updated"
            );
            Ok(redirect_with_success(
                &detail_path,
                &format!("Status set to {}", status.label()),
            )
            .into_response())
        }
        Err(RepositoryError::NotFound) => Err(AppError::NotFound(format!("order {order_id}"))),
        Err(e) => {
            tracing::error!(error = %e, order_id = %order_id, "Failed to update order status");
            Ok(redirect_with_error(&detail_path, "Could not update the status").into_response())
        }
    }
}
