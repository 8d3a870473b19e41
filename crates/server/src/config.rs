//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional (with defaults)
//! - `KHAJA_DATABASE_URL` - `SQLite` connection string (falls back to
//!   `DATABASE_URL`, then `sqlite:khaja.db`)
//! - `KHAJA_HOST` - Bind address (default: 127.0.0.1)
//! - `KHAJA_PORT` - Listen port (default: 5000)
//!
//! ## Optional (feature-enabling; the matching payment/notification path is
//! disabled when unset)
//! - `KHALTI_SECRET_KEY` - Khalti wallet verification key
//! - `STRIPE_SECRET_KEY` - Stripe API secret for hosted checkout sessions
//! - `CHECKOUT_SUCCESS_URL` / `CHECKOUT_CANCEL_URL` - Stripe redirect URLs
//! - `WHATSAPP_PHONE_ID` / `WHATSAPP_ACCESS_TOKEN` - WhatsApp Cloud API
//!   credentials for order confirmations
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Khaja application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `SQLite` database connection URL
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Khalti wallet verification configuration (None = wallet path disabled)
    pub khalti: Option<KhaltiConfig>,
    /// Stripe checkout-session configuration (None = card path disabled)
    pub stripe: Option<StripeConfig>,
    /// WhatsApp messaging configuration (None = notifications disabled)
    pub whatsapp: Option<WhatsAppConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Khalti payment verification configuration.
#[derive(Debug, Clone)]
pub struct KhaltiConfig {
    /// Merchant secret key used as `Authorization: Key <secret>`
    pub secret_key: SecretString,
}

/// Stripe hosted-checkout configuration.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Stripe API secret key
    pub secret_key: SecretString,
    /// Redirect target after a completed checkout
    pub success_url: String,
    /// Redirect target after an abandoned checkout
    pub cancel_url: String,
}

/// WhatsApp Cloud API configuration.
#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    /// Business phone number id (path segment of the Graph API endpoint)
    pub phone_id: String,
    /// Bearer access token
    pub access_token: SecretString,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a present variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("KHAJA_DATABASE_URL");
        let host = get_env_or_default("KHAJA_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("KHAJA_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("KHAJA_PORT", "5000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("KHAJA_PORT".to_string(), e.to_string()))?;

        let khalti = get_optional_env("KHALTI_SECRET_KEY").map(|key| KhaltiConfig {
            secret_key: SecretString::from(key),
        });

        let stripe = get_optional_env("STRIPE_SECRET_KEY").map(|key| StripeConfig {
            secret_key: SecretString::from(key),
            success_url: get_env_or_default("CHECKOUT_SUCCESS_URL", "http://localhost:3000/success"),
            cancel_url: get_env_or_default("CHECKOUT_CANCEL_URL", "http://localhost:3000/cancel"),
        });

        // Messaging needs both the phone id and the token; a half-configured
        // deployment behaves as unconfigured.
        let whatsapp = match (
            get_optional_env("WHATSAPP_PHONE_ID"),
            get_optional_env("WHATSAPP_ACCESS_TOKEN"),
        ) {
            (Some(phone_id), Some(token)) => Some(WhatsAppConfig {
                phone_id,
                access_token: SecretString::from(token),
            }),
            _ => None,
        };

        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            khalti,
            stripe,
            whatsapp,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`, defaulting to a
/// local `SQLite` file.
fn get_database_url(primary_key: &str) -> SecretString {
    if let Ok(value) = std::env::var(primary_key) {
        return SecretString::from(value);
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return SecretString::from(value);
    }
    SecretString::from("sqlite:khaja.db")
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
