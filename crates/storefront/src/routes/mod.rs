//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Customer login page
//! POST /login                  - Store name/phone in the session (rate limited)
//! POST /logout                 - Clear customer and cart
//!
//! # Menu (requires customer)
//! GET  /menu?category=ID       - Categories and available items
//!
//! # Cart (requires customer)
//! GET  /cart                   - Cart lines and totals
//! POST /cart/add               - Add one unit, redirect back
//! POST /cart/remove            - Remove one unit, redirect back
//! POST /cart/clear             - Empty the cart
//!
//! # Checkout (requires customer)
//! POST /checkout               - Create a PAYMENT_PENDING order, redirect to payment
//! GET  /after-payment          - Invoice or payment failure page
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod menu;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use serde::Deserialize;

use crate::middleware::login_rate_limiter;
use crate::state::AppState;

/// Query parameters for flash message display.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    let login = Router::new()
        .route("/login", post(auth::login))
        .route_layer(login_rate_limiter());

    Router::new()
        .route("/", get(auth::login_page))
        .route("/logout", post(auth::logout))
        .merge(login)
        .route("/menu", get(menu::show))
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::checkout))
        .route("/after-payment", get(checkout::after_payment))
}

/// Create the cart routes router.
fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Redirect to `path` with an `error` flash message.
#[must_use]
pub fn redirect_with_error(path: &str, message: &str) -> Redirect {
    Redirect::to(&with_flash(path, "error", message))
}

/// Redirect to `path` with a `success` flash message.
#[must_use]
pub fn redirect_with_success(path: &str, message: &str) -> Redirect {
    Redirect::to(&with_flash(path, "success", message))
}

fn with_flash(path: &str, key: &str, message: &str) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}{key}={}", urlencoding::encode(message))
}

/// Resolve a user-supplied redirect target.
///
/// Only same-site absolute paths are honored; anything else (including
/// protocol-relative `//host` URLs) falls back to `fallback`.
#[must_use]
pub fn safe_redirect_target(target: Option<&str>, fallback: &str) -> String {
    match target.map(str::trim) {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_owned()
        }
        _ => fallback.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_flash_encodes_message() {
        assert_eq!(
            with_flash("/cart", "error", "Your cart is empty"),
            "/cart?error=Your%20cart%20is%20empty"
        );
        assert_eq!(
            with_flash("/menu?category=2", "success", "Added"),
            "/menu?category=2&success=Added"
        );
    }

    #[test]
    fn test_safe_redirect_target() {
        assert_eq!(safe_redirect_target(Some("/menu?category=3"), "/menu"), "/menu?category=3");
        assert_eq!(safe_redirect_target(Some("//evil.example"), "/menu"), "/menu");
        assert_eq!(safe_redirect_target(Some("https://evil.example"), "/menu"), "/menu");
        assert_eq!(safe_redirect_target(Some("/\\evil.example"), "/menu"), "/menu");
        assert_eq!(safe_redirect_target(None, "/cart"), "/cart");
    }
}
