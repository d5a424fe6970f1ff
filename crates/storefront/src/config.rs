//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `TAX_RATE_PERCENT` - GST percentage applied to every order (default: 5)
//! - `MEDIA_DIR` - Directory holding menu item images (default: ./media)
//! - `MEDIA_BASE_URL` - Public URL prefix for images (default: `{base_url}/media`)
//! - `PAYMENT_GATEWAY_URL` - Hosted payment page; checkout skips payment when unset
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate (default: 0.1)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use isra_cafe_core::TaxRate;
use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// GST applied at checkout and shown in the cart
    pub tax_rate: TaxRate,
    /// Local directory served under `/media`
    pub media_dir: PathBuf,
    /// Public URL prefix for media keys
    pub media_base_url: String,
    /// Hosted payment page customers are sent to after checkout
    pub payment_gateway_url: Option<Url>,
    /// Emit JSON logs instead of text
    pub json_logs: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "production", "staging")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = parse_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env("STOREFRONT_PORT", "3000")?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?
            .trim_end_matches('/')
            .to_owned();
        let tax_rate = parse_tax_rate(&get_env_or_default("TAX_RATE_PERCENT", "5"))?;
        let media_dir = PathBuf::from(get_env_or_default("MEDIA_DIR", "./media"));
        let media_base_url = get_optional_env("MEDIA_BASE_URL")
            .map_or_else(|| format!("{base_url}/media"), |url| url.trim_end_matches('/').to_owned());
        let payment_gateway_url = get_optional_env("PAYMENT_GATEWAY_URL")
            .map(|raw| {
                Url::parse(&raw).map_err(|e| {
                    ConfigError::InvalidEnvVar("PAYMENT_GATEWAY_URL".to_owned(), e.to_string())
                })
            })
            .transpose()?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            tax_rate,
            media_dir,
            media_base_url,
            payment_gateway_url,
            json_logs: get_optional_env("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.1")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Public URL of a stored image.
    #[must_use]
    pub fn media_url(&self, key: &str) -> String {
        format!("{}/{}", self.media_base_url, key.trim_start_matches('/'))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a GST percentage such as `5` or `12.5`.
fn parse_tax_rate(raw: &str) -> Result<TaxRate, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("TAX_RATE_PERCENT".to_owned(), reason);
    let percent = Decimal::from_str(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    TaxRate::from_percent(percent).map_err(|e| invalid(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            tax_rate: parse_tax_rate("5").unwrap(),
            media_dir: PathBuf::from("./media"),
            media_base_url: "http://localhost:3000/media".to_string(),
            payment_gateway_url: None,
            json_logs: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_parse_tax_rate() {
        assert_eq!(parse_tax_rate("5").unwrap().label(), "GST (5%)");
        assert_eq!(parse_tax_rate(" 18 ").unwrap().label(), "GST (18%)");
        assert!(matches!(
            parse_tax_rate("five"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(parse_tax_rate("150").is_err());
        assert!(parse_tax_rate("-1").is_err());
    }

    #[test]
    fn test_media_url_joins_key() {
        assert_eq!(
            config().media_url("menu/abc.jpg"),
            "http://localhost:3000/media/menu/abc.jpg"
        );
        assert_eq!(
            config().media_url("/menu/abc.jpg"),
            "http://localhost:3000/media/menu/abc.jpg"
        );
    }

    #[test]
    fn test_debug_does_not_leak_database_url() {
        let debug_output = format!("{:?}", config());
        assert!(!debug_output.contains("postgres://localhost/test"));
    }
}
