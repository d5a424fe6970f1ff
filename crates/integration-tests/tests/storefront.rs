//! Storefront flows driven in-process: customer login, menu browsing, the
//! cart and the checkout guards that run before any database write.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use rust_decimal::Decimal;

use isra_cafe_core::{Category, CategoryId, CategoryWithItems, MenuItem, MenuItemId};
use isra_cafe_integration_tests::{TestClient, assert_redirect, location, storefront, text};

fn item(id: i32, category_id: i32, name: &str, price: Decimal) -> MenuItem {
    MenuItem {
        id: MenuItemId::new(id),
        category_id: CategoryId::new(category_id),
        name: name.to_owned(),
        price,
        image_key: None,
        position: 0,
        is_available: true,
    }
}

fn sample_menu() -> Vec<CategoryWithItems> {
    vec![
        CategoryWithItems {
            category: Category {
                id: CategoryId::new(1),
                name: "Breakfast".to_owned(),
                position: 0,
            },
            items: vec![item(1, 1, "Masala Dosa", Decimal::new(12000, 2))],
        },
        CategoryWithItems {
            category: Category {
                id: CategoryId::new(2),
                name: "Beverages".to_owned(),
                position: 1,
            },
            items: vec![item(2, 2, "Filter Coffee", Decimal::new(4050, 2))],
        },
    ]
}

/// A client with a logged-in customer and the sample menu cached.
async fn logged_in() -> TestClient {
    let (mut client, state) = storefront();
    state.menu().prime(sample_menu()).await;

    let response = client
        .post_form("/login", &[("name", "Isra"), ("phone", "9876543210")])
        .await;
    assert_redirect(&response, "/menu");
    assert!(client.has_session());
    client
}

// =============================================================================
// Health and Headers
// =============================================================================

#[tokio::test]
async fn test_health() {
    let (mut client, _) = storefront();

    let response = client.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let (mut client, _) = storefront();

    let response = client.get("/health/ready").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_responses_carry_security_headers_and_request_id() {
    let (mut client, _) = storefront();

    let response = client.get("/").await;
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("x-request-id"));
}

// =============================================================================
// Customer Login
// =============================================================================

#[tokio::test]
async fn test_pages_require_a_customer() {
    let (mut client, _) = storefront();

    for path in ["/menu", "/cart"] {
        let response = client.get(path).await;
        assert_redirect(&response, "/");
    }

    let response = client.post_form("/checkout", &[]).await;
    assert_redirect(&response, "/");
}

#[tokio::test]
async fn test_login_page_renders_form() {
    let (mut client, _) = storefront();

    let response = client.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = text(response).await;
    assert!(body.contains(r#"name="name""#));
    assert!(body.contains(r#"name="phone""#));
}

#[tokio::test]
async fn test_login_rejects_invalid_phone() {
    let (mut client, _) = storefront();

    let response = client
        .post_form("/login", &[("name", "Isra"), ("phone", "12345")])
        .await;
    assert_redirect(&response, "/?error=Enter%20a%20valid%20phone%20number");
}

#[tokio::test]
async fn test_login_rejects_short_name() {
    let (mut client, _) = storefront();

    let response = client
        .post_form("/login", &[("name", "I"), ("phone", "9876543210")])
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/?error=Name"));
}

#[tokio::test]
async fn test_known_customer_skips_login_page() {
    let mut client = logged_in().await;

    let response = client.get("/").await;
    assert_redirect(&response, "/menu");
}

#[tokio::test]
async fn test_logout_forgets_customer() {
    let mut client = logged_in().await;

    let response = client.post_form("/logout", &[]).await;
    assert_redirect(&response, "/");

    let response = client.get("/menu").await;
    assert_redirect(&response, "/");
}

// =============================================================================
// Menu
// =============================================================================

#[tokio::test]
async fn test_menu_shows_first_category_by_default() {
    let mut client = logged_in().await;

    let response = client.get("/menu").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = text(response).await;
    assert!(body.contains("Breakfast"));
    assert!(body.contains("Beverages"));
    assert!(body.contains("Masala Dosa"));
    assert!(body.contains("₹120.00"));
    assert!(!body.contains("Filter Coffee"));
}

#[tokio::test]
async fn test_menu_category_selection() {
    let mut client = logged_in().await;

    let body = text(client.get("/menu?category=2").await).await;
    assert!(body.contains("Filter Coffee"));
    assert!(body.contains("₹40.50"));
    assert!(!body.contains("Masala Dosa"));

    // Unknown categories fall back to the first one
    let body = text(client.get("/menu?category=99").await).await;
    assert!(body.contains("Masala Dosa"));
}

#[tokio::test]
async fn test_menu_without_database_shows_error() {
    let (mut client, _) = storefront();
    client
        .post_form("/login", &[("name", "Isra"), ("phone", "9876543210")])
        .await;

    let response = client.get("/menu").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = text(response).await;
    assert!(body.contains("Could not load the menu"));
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_empty_cart() {
    let mut client = logged_in().await;

    let response = client.get("/cart").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text(response).await.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_add_and_remove_items() {
    let mut client = logged_in().await;

    for _ in 0..2 {
        let response = client
            .post_form(
                "/cart/add",
                &[("item_id", "1"), ("redirect_to", "/menu?category=1")],
            )
            .await;
        assert_redirect(&response, "/menu?category=1");
    }

    let body = text(client.get("/cart").await).await;
    assert!(body.contains("Masala Dosa"));
    assert!(body.contains("₹240.00"));
    assert!(body.contains("₹12.00"));
    assert!(body.contains("₹252.00"));

    let response = client.post_form("/cart/remove", &[("item_id", "1")]).await;
    assert_redirect(&response, "/cart");

    let body = text(client.get("/cart").await).await;
    assert!(body.contains("₹126.00"));

    client.post_form("/cart/remove", &[("item_id", "1")]).await;
    let body = text(client.get("/cart").await).await;
    assert!(body.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_menu_shows_cart_quantity() {
    let mut client = logged_in().await;
    client.post_form("/cart/add", &[("item_id", "2")]).await;

    let body = text(client.get("/menu?category=2").await).await;
    assert!(body.contains("View cart (1)"));
}

#[tokio::test]
async fn test_add_unknown_item() {
    let mut client = logged_in().await;

    let response = client.post_form("/cart/add", &[("item_id", "99")]).await;
    assert_redirect(
        &response,
        "/cart?error=That%20item%20is%20not%20available%20right%20now",
    );
}

#[tokio::test]
async fn test_cart_ignores_offsite_redirects() {
    let mut client = logged_in().await;

    let response = client
        .post_form(
            "/cart/add",
            &[("item_id", "1"), ("redirect_to", "//evil.example/")],
        )
        .await;
    assert_redirect(&response, "/cart");
}

#[tokio::test]
async fn test_clear_cart() {
    let mut client = logged_in().await;
    client.post_form("/cart/add", &[("item_id", "1")]).await;

    let response = client.post_form("/cart/clear", &[]).await;
    assert_redirect(&response, "/cart?success=Cart%20cleared");

    let body = text(client.get("/cart").await).await;
    assert!(body.contains("Your cart is empty"));
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn test_checkout_with_empty_cart() {
    let mut client = logged_in().await;

    let response = client.post_form("/checkout", &[]).await;
    assert_redirect(&response, "/cart?error=Your%20cart%20is%20empty");
}

#[tokio::test]
async fn test_success_without_order_reference() {
    let mut client = logged_in().await;

    let response = client.get("/after-payment?status=success").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = text(response).await;
    assert!(body.contains("Payment not completed"));
    assert!(body.contains("We could not find your order reference."));
}

#[tokio::test]
async fn test_failure_without_order_reference_reports_payment() {
    let mut client = logged_in().await;

    let body = text(client.get("/after-payment?status=failure").await).await;
    assert!(body.contains("Your payment was not completed"));
    assert!(!body.contains("order reference"));
}

#[tokio::test]
async fn test_success_with_malformed_order_reference() {
    let mut client = logged_in().await;

    let body = text(client.get("/after-payment?status=success&orderId=abc").await).await;
    assert!(body.contains("We could not find your order reference."));
}

#[tokio::test]
async fn test_failed_payment_keeps_cart() {
    let mut client = logged_in().await;
    client.post_form("/cart/add", &[("item_id", "1")]).await;

    let response = client
        .get("/after-payment?status=failed&orderId=7c9e6679-7425-40de-944b-e07fc1f90ae7")
        .await;
    let body = text(response).await;
    assert!(body.contains("Your payment was not completed"));

    let body = text(client.get("/cart").await).await;
    assert!(body.contains("Masala Dosa"));
}
