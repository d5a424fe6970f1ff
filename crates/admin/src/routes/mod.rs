//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Verify email and password (rate limited)
//! POST /auth/logout            - End the session
//!
//! # Dashboard (requires admin)
//! GET  /                       - Greeting and order counts by status
//!
//! # Orders (requires admin)
//! GET  /orders                 - All orders, newest first
//! GET  /orders/{id}            - Order detail with lines and totals
//! POST /orders/{id}/status     - Change status
//!
//! # Menu (requires admin)
//! GET  /menu                   - Items grouped by category
//! GET  /menu/new               - New item form
//! POST /menu                   - Create item (multipart, image required)
//! GET  /menu/{id}/edit         - Edit item form
//! POST /menu/{id}              - Update item (multipart, image optional)
//! POST /menu/{id}/delete       - Delete item and its image
//! ```

pub mod auth;
pub mod dashboard;
pub mod menu;
pub mod orders;

use askama::Template;
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;

use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Query parameters for flash message display.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Signed-in admin as shown in the page header.
#[derive(Debug, Clone)]
pub struct AdminView {
    pub name: String,
    pub email: String,
}

impl From<&CurrentAdmin> for AdminView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            name: admin.name.clone(),
            email: admin.email.to_string(),
        }
    }
}

/// Create all routes for admin.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .merge(auth::router())
        .merge(orders::router())
        .merge(menu::router())
}

/// Render a template into an HTML response.
///
/// Render failures are logged and answered with a bare 500.
pub fn render<T: Template>(template: &T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Template render error");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
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

#[cfg(test)]
mod tests {
    use axum::http::header::LOCATION;

    use super::*;

    #[test]
    fn test_redirect_with_error_sets_location() {
        let response = redirect_with_error("/menu/new", "Name is required").into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some("/menu/new?error=Name%20is%20required")
        );
    }

    #[test]
    fn test_with_flash_appends_to_existing_query() {
        assert_eq!(
            with_flash("/orders?page=2", "success", "Saved"),
            "/orders?page=2&success=Saved"
        );
    }
}
