//! Customer login and logout.
//!
//! Customers are not authenticated. The login form asks for a name and a
//! mobile number, validates their shape, and stores them in the session so
//! orders carry contact details.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::Query,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::{MessageQuery, redirect_with_error};
use crate::middleware::{OptionalCustomer, clear_current_customer, set_current_customer};
use crate::models::CurrentCustomer;
use crate::services::load_cart;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub name: String,
    pub phone: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Display the login page, or skip it when a customer is already known.
///
/// GET /
pub async fn login_page(
    OptionalCustomer(customer): OptionalCustomer,
    Query(query): Query<MessageQuery>,
) -> Response {
    if customer.is_some() {
        return Redirect::to("/menu").into_response();
    }

    LoginTemplate {
        error: query.error,
        success: query.success,
    }
    .into_response()
}

/// Handle login form submission.
///
/// POST /login
#[instrument(skip(session, form))]
pub async fn login(session: Session, Form(form): Form<LoginForm>) -> Response {
    let customer = match CurrentCustomer::from_login(&form.name, &form.phone) {
        Ok(customer) => customer,
        Err(e) => return redirect_with_error("/", &e.to_string()).into_response(),
    };

    if let Err(e) = set_current_customer(&session, &customer).await {
        tracing::error!(error = %e, "Failed to store customer in session");
        return redirect_with_error("/", "Could not start your session. Please try again.")
            .into_response();
    }

    tracing::info!("Customer logged in");
    Redirect::to("/menu").into_response()
}

/// Forget the customer and their cart.
///
/// POST /logout
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Redirect {
    match load_cart(&session).await {
        Ok(mut cart) => {
            if let Err(e) = cart.clear().await {
                tracing::warn!(error = %e, "Failed to clear cart on logout");
            }
        }
        Err(e) => tracing::warn!(error = %e, "Failed to load cart on logout"),
    }

    if let Err(e) = clear_current_customer(&session).await {
        tracing::warn!(error = %e, "Failed to clear customer on logout");
    }

    Redirect::to("/")
}
