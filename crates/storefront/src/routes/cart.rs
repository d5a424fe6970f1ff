//! Cart route handlers.
//!
//! The cart lives in the customer's session. Every mutation is a plain form
//! POST that redirects back to the page it came from.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use isra_cafe_core::{Cart, MenuItemId, OrderTotals};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::{MessageQuery, redirect_with_error, redirect_with_success, safe_redirect_target};
use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireCustomer;
use crate::services::load_cart;
use crate::state::AppState;

/// Cart line display data for templates.
pub struct CartLineView {
    pub id: i32,
    pub name: String,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
}

/// Cart display data for templates.
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub item_count: u32,
    pub subtotal: String,
    pub tax_label: String,
    pub tax: String,
    pub total: String,
}

impl CartView {
    fn new(cart: &Cart, totals: &OrderTotals) -> Self {
        Self {
            lines: cart
                .lines()
                .map(|line| CartLineView {
                    id: line.item_id.as_i32(),
                    name: line.name.clone(),
                    unit_price: line.unit_price_display(),
                    quantity: line.quantity,
                    line_total: line.line_total_display(),
                })
                .collect(),
            item_count: cart.item_count(),
            subtotal: totals.subtotal_display(),
            tax_label: totals.tax_label(),
            tax: totals.tax_display(),
            total: totals.total_display(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartTemplate {
    pub customer_name: String,
    pub cart_count: u32,
    pub cart: CartView,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Form data for adding or removing one unit of an item.
#[derive(Debug, Deserialize)]
pub struct CartItemForm {
    pub item_id: i32,
    /// Page to return to; defaults to the cart.
    pub redirect_to: Option<String>,
}

/// Display the cart.
///
/// GET /cart
#[instrument(skip(state, session, customer))]
pub async fn show(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    session: Session,
    Query(query): Query<MessageQuery>,
) -> Result<CartTemplate> {
    let cart = load_cart(&session).await?;
    let totals = cart.cart().totals(state.config().tax_rate);

    Ok(CartTemplate {
        customer_name: customer.name.to_string(),
        cart_count: cart.cart().item_count(),
        cart: CartView::new(cart.cart(), &totals),
        error: query.error,
        success: query.success,
    })
}

/// Add one unit of an available item.
///
/// POST /cart/add
#[instrument(skip(state, session, _customer))]
pub async fn add(
    State(state): State<AppState>,
    RequireCustomer(_customer): RequireCustomer,
    session: Session,
    Form(form): Form<CartItemForm>,
) -> Result<Response> {
    let back = safe_redirect_target(form.redirect_to.as_deref(), "/cart");
    let item_id = MenuItemId::new(form.item_id);

    let Some(item) = state.menu().find_available_item(state.pool(), item_id).await? else {
        return Ok(redirect_with_error(&back, "That item is not available right now").into_response());
    };

    let mut cart = load_cart(&session).await?;
    let quantity = cart.add_item(&item).await?;

    let item_id = item_id.to_string();
    add_breadcrumb("cart", "Added item", &[("item_id", item_id.as_str())]);
    tracing::debug!(item_id = %item_id, quantity, "Cart item added");

    Ok(Redirect::to(&back).into_response())
}

/// Remove one unit of an item; the line disappears at zero.
///
/// POST /cart/remove
#[instrument(skip(session, _customer))]
pub async fn remove(
    RequireCustomer(_customer): RequireCustomer,
    session: Session,
    Form(form): Form<CartItemForm>,
) -> Result<Redirect> {
    let back = safe_redirect_target(form.redirect_to.as_deref(), "/cart");

    let mut cart = load_cart(&session).await?;
    let quantity = cart.remove_item(MenuItemId::new(form.item_id)).await?;
    tracing::debug!(item_id = form.item_id, quantity, "Cart item removed");

    Ok(Redirect::to(&back))
}

/// Empty the cart.
///
/// POST /cart/clear
#[instrument(skip(session, _customer))]
pub async fn clear(
    RequireCustomer(_customer): RequireCustomer,
    session: Session,
) -> Result<Redirect> {
    let mut cart = load_cart(&session).await?;
    cart.clear().await?;
    Ok(redirect_with_success("/cart", "Cart cleared"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use isra_cafe_core::{CategoryId, MenuItem, TaxRate};
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_cart_view_formats_money() {
        let mut cart = Cart::default();
        let coffee = MenuItem {
            id: MenuItemId::new(5),
            category_id: CategoryId::new(1),
            name: "Cold Coffee".to_owned(),
            price: Decimal::new(8950, 2),
            image_key: None,
            position: 1,
            is_available: true,
        };
        cart.add_item(&coffee);
        cart.add_item(&coffee);

        let totals = cart.totals(TaxRate::from_percent(Decimal::new(5, 0)).unwrap());
        let view = CartView::new(&cart, &totals);

        assert!(!view.is_empty());
        assert_eq!(view.item_count, 2);
        assert_eq!(view.lines[0].unit_price, "₹89.50");
        assert_eq!(view.lines[0].line_total, "₹179.00");
        assert_eq!(view.subtotal, "₹179.00");
        assert_eq!(view.tax_label, "GST (5%)");
        assert_eq!(view.tax, "₹8.95");
        assert_eq!(view.total, "₹187.95");
    }

    #[test]
    fn test_empty_cart_view() {
        let cart = Cart::default();
        let totals = cart.totals(TaxRate::from_percent(Decimal::new(5, 0)).unwrap());
        let view = CartView::new(&cart, &totals);
        assert!(view.is_empty());
        assert_eq!(view.total, "₹0.00");
    }
}
