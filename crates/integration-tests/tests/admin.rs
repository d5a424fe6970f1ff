//! Admin panel flows that run without a database: the login gate, the
//! login form's input checks and the response headers.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;

use isra_cafe_integration_tests::{admin, assert_redirect, text};

#[tokio::test]
async fn test_health() {
    let mut client = admin();

    let response = client.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let mut client = admin();

    let response = client.get("/health/ready").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_pages_require_admin() {
    let mut client = admin();

    for path in ["/", "/orders", "/menu", "/menu/new", "/menu/1/edit"] {
        let response = client.get(path).await;
        assert_redirect(&response, "/auth/login");
    }

    let response = client
        .post_form("/orders/7c9e6679-7425-40de-944b-e07fc1f90ae7/status", &[("status", "COMPLETED")])
        .await;
    assert_redirect(&response, "/auth/login");

    let response = client.post_form("/menu/1/delete", &[]).await;
    assert_redirect(&response, "/auth/login");
}

#[tokio::test]
async fn test_login_page_renders_form() {
    let mut client = admin();

    let response = client.get("/auth/login").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["cache-control"], "no-store");
    let body = text(response).await;
    assert!(body.contains(r#"name="email""#));
    assert!(body.contains(r#"name="password""#));
}

#[tokio::test]
async fn test_login_rejects_malformed_email() {
    let mut client = admin();

    let response = client
        .post_form(
            "/auth/login",
            &[("email", "not-an-email"), ("password", "correct horse battery")],
        )
        .await;
    assert_redirect(
        &response,
        "/auth/login?error=Invalid%20email%20or%20password",
    );
}

#[tokio::test]
async fn test_login_is_rate_limited() {
    let mut client = admin();

    let mut statuses = Vec::new();
    for _ in 0..5 {
        let response = client
            .post_form("/auth/login", &[("email", "bad"), ("password", "x")])
            .await;
        statuses.push(response.status());
    }

    assert_eq!(statuses[0], StatusCode::SEE_OTHER);
    assert_eq!(statuses.last(), Some(&StatusCode::TOO_MANY_REQUESTS));
}

#[tokio::test]
async fn test_responses_carry_security_headers() {
    let mut client = admin();

    let response = client.get("/auth/login").await;
    let headers = response.headers();
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["referrer-policy"], "no-referrer");
    let csp = headers["content-security-policy"].to_str().unwrap();
    assert!(csp.contains("form-action 'self'"));
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_logout_without_session_returns_to_login() {
    let mut client = admin();

    let response = client.post_form("/auth/logout", &[]).await;
    assert_redirect(&response, "/auth/login");
}
