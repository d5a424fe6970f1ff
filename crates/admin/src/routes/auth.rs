//! Authentication route handlers for admin.
//!
//! Email and password sign-in. The admin marker is written to the session
//! only after the password hash verifies.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::{MessageQuery, redirect_with_error, render};
use crate::middleware::auth::LOGIN_PATH;
use crate::middleware::{OptionalAdminAuth, clear_current_admin, login_rate_limiter, set_current_admin};
use crate::models::CurrentAdmin;
use crate::services::{AdminAuthError, AdminAuthService};
use crate::state::AppState;

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginPageTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    let login = Router::new()
        .route(LOGIN_PATH, post(login))
        .route_layer(login_rate_limiter());

    Router::new()
        .route(LOGIN_PATH, get(login_page))
        .merge(login)
        .route("/auth/logout", post(logout))
}

/// Render the login page.
///
/// GET /auth/login
async fn login_page(
    OptionalAdminAuth(admin): OptionalAdminAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if admin.is_some() {
        return Redirect::to("/").into_response();
    }

    render(&LoginPageTemplate {
        error: query.error,
        success: query.success,
    })
}

/// Verify credentials and start an admin session.
///
/// POST /auth/login
#[instrument(skip(state, session, form), fields(email = %form.email))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let user = match AdminAuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => user,
        Err(AdminAuthError::InvalidEmail(_) | AdminAuthError::InvalidCredentials) => {
            tracing::warn!("Failed admin login attempt");
            return redirect_with_error(LOGIN_PATH, "Invalid email or password").into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "Admin login failed");
            return redirect_with_error(LOGIN_PATH, "Sign-in is unavailable right now")
                .into_response();
        }
    };

    let admin = CurrentAdmin::from(&user);
    if let Err(e) = set_current_admin(&session, &admin).await {
        tracing::error!(error = %e, "Failed to store admin in session");
        return redirect_with_error(LOGIN_PATH, "Sign-in is unavailable right now").into_response();
    }

    tracing::info!(admin_id = %admin.id, "Admin logged in");
    Redirect::to("/").into_response()
}

/// Logout and clear session.
///
/// POST /auth/logout
#[instrument(skip(session))]
async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_current_admin(&session).await {
        tracing::warn!(error = %e, "Failed to clear admin session");
    }

    Redirect::to(LOGIN_PATH)
}
