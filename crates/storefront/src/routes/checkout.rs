//! Checkout and the payment return page.
//!
//! Checkout re-prices the cart from the live menu, stores the order as
//! `PAYMENT_PENDING` and hands the customer to the payment gateway. The
//! gateway sends them back to `/after-payment` with the outcome.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use isra_cafe_core::{MenuItemId, NewOrder, Order, OrderId, OrderItem, Price};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use url::Url;

use super::redirect_with_error;
use crate::config::StorefrontConfig;
use crate::db::{MenuRepository, OrderRepository};
use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireCustomer;
use crate::models::CurrentCustomer;
use crate::services::load_cart;
use crate::state::AppState;

/// Query parameters the payment gateway returns with.
#[derive(Debug, Default, Deserialize)]
pub struct AfterPaymentQuery {
    pub status: Option<String>,
    #[serde(rename = "orderId")]
    pub order_id: Option<String>,
}

/// Invoice line display data.
pub struct InvoiceLineView {
    pub name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

/// Invoice page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/invoice.html")]
pub struct InvoiceTemplate {
    pub customer_name: String,
    pub cart_count: u32,
    pub order_id: String,
    pub order_date: String,
    pub order_customer: String,
    pub order_mobile: String,
    pub status: String,
    pub lines: Vec<InvoiceLineView>,
    pub subtotal: String,
    pub tax_label: String,
    pub tax: String,
    pub total: String,
}

impl InvoiceTemplate {
    fn new(customer: &CurrentCustomer, order: &Order, items: &[OrderItem]) -> Self {
        let totals = order.totals();
        Self {
            customer_name: customer.name.to_string(),
            cart_count: 0,
            order_id: order.id.to_string(),
            order_date: order.created_at.format("%d %b %Y, %H:%M UTC").to_string(),
            order_customer: order.customer_name.clone(),
            order_mobile: order.customer_mobile.clone(),
            status: order.status.label().to_owned(),
            lines: items
                .iter()
                .map(|item| InvoiceLineView {
                    name: item.item_name.clone(),
                    quantity: item.quantity,
                    unit_price: Price::inr(item.price_per_item).display(),
                    line_total: item.line_total_display(),
                })
                .collect(),
            subtotal: totals.subtotal_display(),
            tax_label: totals.tax_label(),
            tax: totals.tax_display(),
            total: totals.total_display(),
        }
    }
}

/// Payment failure page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/payment_failed.html")]
pub struct PaymentFailedTemplate {
    pub customer_name: String,
    pub cart_count: u32,
    pub message: String,
}

/// Where to send the customer after their order is stored.
fn payment_redirect_url(config: &StorefrontConfig, order: &Order) -> String {
    let order_id = order.id.to_string();
    match &config.payment_gateway_url {
        Some(gateway) => {
            let mut url: Url = gateway.clone();
            url.query_pairs_mut()
                .append_pair("orderId", &order_id)
                .append_pair("amount", &Price::inr(order.total_amount).rounded().to_string())
                .append_pair("returnUrl", &format!("{}/after-payment", config.base_url));
            url.into()
        }
        None => format!("/after-payment?status=success&orderId={order_id}"),
    }
}

/// Create a pending order from the cart and redirect to payment.
///
/// POST /checkout
#[instrument(skip(state, session, customer))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    session: Session,
) -> Result<Response> {
    let cart = load_cart(&session).await?;
    let ids: Vec<MenuItemId> = cart.cart().lines().map(|line| line.item_id).collect();
    let live_items = if ids.is_empty() {
        Vec::new()
    } else {
        MenuRepository::new(state.pool()).get_items(&ids).await?
    };

    let new_order = match NewOrder::from_cart(
        customer.name.clone(),
        customer.phone.clone(),
        cart.cart(),
        &live_items,
        state.config().tax_rate,
    ) {
        Ok(order) => order,
        Err(e) => return Ok(redirect_with_error("/cart", &e.to_string()).into_response()),
    };

    let order = OrderRepository::new(state.pool()).create(&new_order).await?;

    let order_id = order.id.to_string();
    add_breadcrumb("checkout", "Order created", &[("order_id", order_id.as_str())]);
    tracing::info!(
        order_id = %order_id,
        lines = new_order.lines.len(),
        total = %order.total_amount,
        "Order created"
    );

    Ok(Redirect::to(&payment_redirect_url(state.config(), &order)).into_response())
}

/// Render the invoice for a paid order, or the failure page.
///
/// GET /after-payment?status=success|failure&orderId=UUID
#[instrument(skip(state, session, customer))]
pub async fn after_payment(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    session: Session,
    Query(query): Query<AfterPaymentQuery>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await?;
    let cart_count = cart.cart().item_count();
    let failed = |message: &str| {
        PaymentFailedTemplate {
            customer_name: customer.name.to_string(),
            cart_count,
            message: message.to_owned(),
        }
        .into_response()
    };

    if query.status.as_deref() != Some("success") {
        tracing::info!(order_id = ?query.order_id, status = ?query.status, "Payment not completed");
        return Ok(failed("Your payment was not completed. Your cart has been kept."));
    }
    let Some(raw_id) = query.order_id.as_deref() else {
        return Ok(failed("We could not find your order reference."));
    };
    let Ok(order_id) = raw_id.parse::<OrderId>() else {
        return Ok(failed("We could not find your order reference."));
    };

    let repo = OrderRepository::new(state.pool());
    let mut order = match repo.get(order_id).await? {
        Some(order) if order.customer_mobile == customer.phone.as_str() => order,
        _ => {
            tracing::warn!(order_id = %order_id, "Order not found for customer");
            return Ok(failed("We could not find that order."));
        }
    };
    let items = repo.items(order_id).await?;

    if repo.mark_placed(order_id).await? {
        tracing::info!(order_id = %order_id, "Order placed");
    }
    order.status = order.status.after_payment();

    cart.clear().await?;
    tracing::info!(order_id = %order_id, "Payment completed");

    Ok(InvoiceTemplate::new(&customer, &order, &items).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use chrono::{TimeZone, Utc};
    use isra_cafe_core::{OrderItemId, OrderStatus, TaxRate};
    use rust_decimal::Decimal;
    use secrecy::SecretString;

    use super::*;

    fn config(gateway: Option<&str>) -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/isra_cafe"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "https://cafe.example".to_owned(),
            tax_rate: TaxRate::from_percent(Decimal::new(5, 0)).unwrap(),
            media_dir: PathBuf::from("./media"),
            media_base_url: "https://cafe.example/media".to_owned(),
            payment_gateway_url: gateway.map(|g| Url::parse(g).unwrap()),
            json_logs: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    fn order() -> Order {
        Order {
            id: "6f1c1c3e-0f5e-4b6a-9d55-2d9f3f1b8a10".parse().unwrap(),
            customer_name: "Isra".to_owned(),
            customer_mobile: "9876543210".to_owned(),
            subtotal: Decimal::new(15050, 2),
            tax_rate: TaxRate::from_percent(Decimal::new(5, 0)).unwrap(),
            tax_amount: Decimal::new(75250, 4),
            total_amount: Decimal::new(1580250, 4),
            status: OrderStatus::PaymentPending,
            created_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_redirect_without_gateway_goes_straight_to_invoice() {
        assert_eq!(
            payment_redirect_url(&config(None), &order()),
            "/after-payment?status=success&orderId=6f1c1c3e-0f5e-4b6a-9d55-2d9f3f1b8a10"
        );
    }

    #[test]
    fn test_redirect_to_gateway_carries_order() {
        let url = payment_redirect_url(&config(Some("https://pay.example/checkout?merchant=isra")), &order());
        let url = Url::parse(&url).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("pay.example"));
        assert_eq!(
            pairs,
            vec![
                ("merchant".to_owned(), "isra".to_owned()),
                ("orderId".to_owned(), "6f1c1c3e-0f5e-4b6a-9d55-2d9f3f1b8a10".to_owned()),
                ("amount".to_owned(), "158.03".to_owned()),
                ("returnUrl".to_owned(), "https://cafe.example/after-payment".to_owned()),
            ]
        );
    }

    #[test]
    fn test_invoice_uses_stored_totals() {
        let customer = CurrentCustomer::from_login("Isra", "9876543210").unwrap();
        let order = order();
        let items = vec![OrderItem {
            id: OrderItemId::new(1),
            order_id: order.id,
            menu_item_id: None,
            item_name: "Paneer Roll".to_owned(),
            quantity: 2,
            price_per_item: Decimal::new(7525, 2),
        }];

        let invoice = InvoiceTemplate::new(&customer, &order, &items);
        assert_eq!(invoice.order_date, "14 Mar 2026, 09:30 UTC");
        assert_eq!(invoice.lines[0].line_total, "₹150.50");
        assert_eq!(invoice.subtotal, "₹150.50");
        assert_eq!(invoice.tax_label, "GST (5%)");
        assert_eq!(invoice.tax, "₹7.53");
        assert_eq!(invoice.total, "₹158.03");
    }
}
