//! Casting service configuration.
//!
//! Configuration is loaded from environment variables. The database URL is
//! held as a secret and redacted in Debug output.

use crate::auth::jwks::{DEFAULT_CACHE_TTL_SECONDS, DEFAULT_FETCH_TIMEOUT_SECONDS};
use common::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Upper bound for the key set cache TTL (one day).
pub const MAX_CACHE_TTL_SECONDS: u64 = 86_400;

/// Upper bound for a single key set fetch.
pub const MAX_FETCH_TIMEOUT_SECONDS: u64 = 60;

/// Casting service configuration.
#[derive(Clone)]
pub struct Config {
    /// Identity provider domain, e.g. `casting.eu.auth0.com`.
    pub auth_domain: String,

    /// Audience every accepted token must carry.
    pub audience: String,

    /// Exact issuer every accepted token must carry.
    pub issuer: String,

    /// Key set endpoint.
    pub jwks_url: String,

    pub jwks_cache_ttl: Duration,

    pub jwks_fetch_timeout: Duration,

    /// PostgreSQL connection URL. `None` selects the in-memory store.
    pub database_url: Option<SecretString>,

    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("auth_domain", &self.auth_domain)
            .field("audience", &self.audience)
            .field("issuer", &self.issuer)
            .field("jwks_url", &self.jwks_url)
            .field("jwks_cache_ttl", &self.jwks_cache_ttl)
            .field("jwks_fetch_timeout", &self.jwks_fetch_timeout)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("bind_address", &self.bind_address)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWKS cache TTL configuration: {0}")]
    InvalidCacheTtl(String),

    #[error("Invalid JWKS fetch timeout configuration: {0}")]
    InvalidFetchTimeout(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let auth_domain = required(vars, "AUTH_DOMAIN")?
            .trim_end_matches('/')
            .to_string();
        let audience = required(vars, "AUTH_AUDIENCE")?;

        let issuer = vars
            .get("AUTH_ISSUER")
            .cloned()
            .unwrap_or_else(|| format!("https://{auth_domain}/"));

        let jwks_url = vars
            .get("JWKS_URL")
            .cloned()
            .unwrap_or_else(|| format!("https://{auth_domain}/.well-known/jwks.json"));

        let jwks_cache_ttl = parse_seconds(
            vars,
            "JWKS_CACHE_TTL_SECONDS",
            DEFAULT_CACHE_TTL_SECONDS,
            MAX_CACHE_TTL_SECONDS,
        )
        .map_err(ConfigError::InvalidCacheTtl)?;

        let jwks_fetch_timeout = parse_seconds(
            vars,
            "JWKS_FETCH_TIMEOUT_SECONDS",
            DEFAULT_FETCH_TIMEOUT_SECONDS,
            MAX_FETCH_TIMEOUT_SECONDS,
        )
        .map_err(ConfigError::InvalidFetchTimeout)?;

        let database_url = vars
            .get("DATABASE_URL")
            .filter(|url| !url.is_empty())
            .map(|url| SecretString::from(url.clone()));

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        Ok(Config {
            auth_domain,
            audience,
            issuer,
            jwks_url,
            jwks_cache_ttl,
            jwks_fetch_timeout,
            database_url,
            bind_address,
        })
    }
}

fn required(vars: &HashMap<String, String>, name: &str) -> Result<String, ConfigError> {
    vars.get(name)
        .filter(|value| !value.trim().is_empty())
        .cloned()
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

/// Parse an optional positive number of seconds no greater than `max`.
fn parse_seconds(
    vars: &HashMap<String, String>,
    name: &str,
    default: u64,
    max: u64,
) -> Result<Duration, String> {
    let Some(value_str) = vars.get(name) else {
        return Ok(Duration::from_secs(default));
    };

    let value: u64 = value_str
        .parse()
        .map_err(|e| format!("{name} must be a valid integer, got '{value_str}': {e}"))?;

    if value == 0 {
        return Err(format!("{name} must be positive, got {value}"));
    }

    if value > max {
        return Err(format!(
            "{name} must not exceed {max} seconds, got {value}"
        ));
    }

    Ok(Duration::from_secs(value))
}
