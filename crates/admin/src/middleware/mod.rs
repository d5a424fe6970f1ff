//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Request ID (propagate or generate `x-request-id`)
//! 4. Security headers (strict CSP, no caching)
//! 5. Session layer (tower-sessions with `PostgreSQL` store)
//! 6. Rate limiting on `POST /auth/login` (governor)
//!
//! Authentication is enforced per handler by the [`RequireAdminAuth`]
//! extractor rather than a router-wide guard.

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAdminAuth, RequireAdminAuth, clear_current_admin, set_current_admin};
pub use rate_limit::login_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{create_session_layer, session_layer, session_store};
