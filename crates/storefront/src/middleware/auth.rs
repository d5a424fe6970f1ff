//! Customer gate extractors.
//!
//! Customers are identified by the name and phone they typed at the login
//! form. The identity lives in the server-side session; the browser only holds
//! the opaque session cookie.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentCustomer, session_keys};

/// Extractor that requires a customer in the session.
///
/// Without one, HTML requests are redirected to the login page at `/` before
/// the handler runs.
///
/// # Example
///
/// ```rust,ignore
/// async fn menu(RequireCustomer(customer): RequireCustomer) -> impl IntoResponse {
///     format!("Hello, {}!", customer.name)
/// }
/// ```
pub struct RequireCustomer(pub CurrentCustomer);

/// Error returned when a customer is required but nobody is logged in.
pub enum CustomerRejection {
    /// Redirect to the login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests or a missing session layer).
    Unauthorized,
}

impl IntoResponse for CustomerRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireCustomer
where
    S: Send + Sync,
{
    type Rejection = CustomerRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(CustomerRejection::Unauthorized)?;

        let customer: CurrentCustomer = session
            .get(session_keys::CURRENT_CUSTOMER)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| {
                if parts.uri.path().starts_with("/api/") {
                    CustomerRejection::Unauthorized
                } else {
                    CustomerRejection::RedirectToLogin
                }
            })?;

        Ok(Self(customer))
    }
}

/// Extractor that optionally gets the current customer.
///
/// Unlike `RequireCustomer`, this never rejects the request.
pub struct OptionalCustomer(pub Option<CurrentCustomer>);

impl<S> FromRequestParts<S> for OptionalCustomer
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let customer = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(customer))
    }
}

/// Helper to set the current customer in the session.
///
/// The session id is cycled first so a pre-login cookie cannot be replayed.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_customer(
    session: &Session,
    customer: &CurrentCustomer,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(session_keys::CURRENT_CUSTOMER, customer)
        .await
}

/// Helper to clear the current customer from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_customer(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
        .await?;
    Ok(())
}
