//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `RAZORPAY_KEY` - Payment gateway key id
//! - `RAZORPAY_SECRET` - Payment gateway key secret, also the signature HMAC key
//!
//! ## Optional
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 8000)
//! - `DATABASE_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `PRODUCTS_OWNER_ID` - User id allowed to create catalog products
//! - `RAZORPAY_API_BASE` - Gateway API base URL (default: <https://api.razorpay.com/v1>)
//! - `NATS_URL` - Event bus; events are not published when unset

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

use crate::domain::value_objects::UserId;

const DEFAULT_RAZORPAY_API_BASE: &str = "https://api.razorpay.com/v1";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: SecretString,
    pub database_max_connections: u32,
    pub host: IpAddr,
    pub port: u16,
    /// Only this user may create products. Unset means nobody may.
    pub products_owner: Option<UserId>,
    pub razorpay: RazorpayConfig,
    pub nats_url: Option<String>,
}

/// Implements `Debug` manually to redact the secret.
#[derive(Clone)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: SecretString,
    pub api_base: String,
}

impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the process environment, reading `.env` first if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);
        Ok(Self {
            database_url: SecretString::from(env.required("DATABASE_URL")?),
            database_max_connections: env.parsed("DATABASE_MAX_CONNECTIONS", 10)?,
            host: env.parsed("HOST", IpAddr::from([0, 0, 0, 0]))?,
            port: env.parsed("PORT", 8000)?,
            products_owner: env
                .optional("PRODUCTS_OWNER_ID")
                .map(|raw| {
                    raw.parse::<UserId>()
                        .map_err(|e| ConfigError::InvalidEnvVar("PRODUCTS_OWNER_ID".to_string(), e.to_string()))
                })
                .transpose()?,
            razorpay: RazorpayConfig {
                key_id: env.required("RAZORPAY_KEY")?,
                key_secret: SecretString::from(env.required("RAZORPAY_SECRET")?),
                api_base: env
                    .optional("RAZORPAY_API_BASE")
                    .unwrap_or_else(|| DEFAULT_RAZORPAY_API_BASE.to_string()),
            },
            nats_url: env.optional("NATS_URL"),
        })
    }

    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Set and non-blank.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn parsed<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
            None => Ok(default),
        }
    }
}
