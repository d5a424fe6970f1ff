//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Request ID (propagate or generate `x-request-id`)
//! 4. Security headers (CSP, frame denial, no-store)
//! 5. Session layer (tower-sessions with `PostgreSQL` store)
//! 6. Rate limiting on the login endpoint (governor)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalCustomer, RequireCustomer, clear_current_customer, set_current_customer};
pub use rate_limit::login_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{create_session_layer, session_layer};
