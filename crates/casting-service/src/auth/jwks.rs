//! JWKS client for fetching and caching the issuer's public signing keys.
//!
//! The JWKS (JSON Web Key Set) client fetches public keys from the issuer's
//! `/.well-known/jwks.json` endpoint and caches them with a configurable TTL.
//!
//! # Caching
//!
//! - A key found in an unexpired cache is returned without network access
//! - A `kid` missing from an unexpired cache triggers one re-fetch, so that
//!   tokens signed with a freshly rotated key are accepted
//! - An expired or empty cache is re-fetched before lookup
//! - A refresh builds a complete new key map and swaps it in under the
//!   write lock; readers never observe a partially updated map

use crate::auth::AuthError;
use crate::observability::metrics;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::instrument;

/// Default cache TTL in seconds (10 minutes).
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 600;

/// Default key-set fetch timeout in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECONDS: u64 = 5;

/// JSON Web Key from the JWKS endpoint.
///
/// Only RSA signing keys are usable; other key types are kept so that the
/// key set deserializes, but are rejected at verification time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Jwk {
    /// Key type ("RSA" for usable keys).
    pub kty: String,

    /// Key ID - used to select the correct key for verification.
    pub kid: String,

    /// Key use (should be "sig").
    #[serde(default, rename = "use")]
    pub key_use: Option<String>,

    /// RSA modulus (base64url encoded).
    #[serde(default)]
    pub n: Option<String>,

    /// RSA public exponent (base64url encoded).
    #[serde(default)]
    pub e: Option<String>,

    /// Algorithm hint (should be "RS256" when present).
    #[serde(default)]
    pub alg: Option<String>,
}

/// JWKS document.
#[derive(Debug, Clone, Deserialize)]
pub struct JwksResponse {
    /// List of JSON Web Keys.
    pub keys: Vec<Jwk>,
}

/// Source of verification keys, looked up by key ID.
///
/// Implemented by [`JwksClient`]; tests substitute canned key sets.
#[async_trait::async_trait]
pub trait KeyProvider: Send + Sync {
    /// Return the key whose `kid` matches.
    ///
    /// # Errors
    ///
    /// - `KeyNotFound` if no key has this ID
    /// - `KeyFetchFailed` if the key set could not be retrieved
    async fn get_key(&self, kid: &str) -> Result<Jwk, AuthError>;
}

/// Cached JWKS data with expiry time.
struct CachedJwks {
    /// Map of key ID to JWK.
    keys: HashMap<String, Jwk>,

    /// When this cache entry expires.
    expires_at: Instant,
}

/// Outcome of a cache lookup.
enum CacheLookup {
    Hit(Jwk),
    /// Cache is valid but has no such key.
    Miss,
    /// Cache is empty or expired.
    Stale,
}

/// JWKS client for fetching and caching public keys.
///
/// Construct once per process and share behind an `Arc`.
pub struct JwksClient {
    /// URL to the JWKS endpoint.
    jwks_url: String,

    /// HTTP client for fetching JWKS (carries the fetch timeout).
    http_client: reqwest::Client,

    /// Cached JWKS data.
    cache: Arc<RwLock<Option<CachedJwks>>>,

    /// Cache TTL duration.
    cache_ttl: Duration,
}

impl JwksClient {
    /// Create a new JWKS client with the default TTL and fetch timeout.
    pub fn new(jwks_url: String) -> Self {
        Self::with_settings(
            jwks_url,
            Duration::from_secs(DEFAULT_CACHE_TTL_SECONDS),
            Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECONDS),
        )
    }

    /// Create a new JWKS client.
    ///
    /// # Arguments
    ///
    /// * `jwks_url` - URL of the issuer's key-set document
    /// * `cache_ttl` - How long a fetched key set is trusted before re-fetching
    /// * `fetch_timeout` - Upper bound on a single key-set fetch
    pub fn with_settings(jwks_url: String, cache_ttl: Duration, fetch_timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(target: "casting.auth.jwks", error = %e, "Failed to build HTTP client with custom config, using defaults");
                reqwest::Client::new()
            });

        Self {
            jwks_url,
            http_client,
            cache: Arc::new(RwLock::new(None)),
            cache_ttl,
        }
    }

    /// URL this client fetches keys from.
    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Force a re-fetch of the key set, replacing the cache.
    ///
    /// # Errors
    ///
    /// Returns `KeyFetchFailed` if the key set cannot be retrieved; the
    /// previous cache is left in place.
    pub async fn force_refresh(&self) -> Result<(), AuthError> {
        self.refresh_cache().await
    }

    async fn lookup(&self, kid: &str) -> CacheLookup {
        let cache = self.cache.read().await;
        match cache.as_ref() {
            Some(cached) if cached.expires_at > Instant::now() => match cached.keys.get(kid) {
                Some(key) => CacheLookup::Hit(key.clone()),
                None => CacheLookup::Miss,
            },
            _ => CacheLookup::Stale,
        }
    }

    /// Refresh the JWKS cache by fetching from the issuer.
    #[instrument(skip(self))]
    async fn refresh_cache(&self) -> Result<(), AuthError> {
        tracing::debug!(target: "casting.auth.jwks", url = %self.jwks_url, "Fetching JWKS");
        let start = Instant::now();

        let result = self.fetch_keys().await;
        metrics::record_jwks_fetch(
            if result.is_ok() { "success" } else { "error" },
            start.elapsed(),
        );
        let keys = result?;

        tracing::info!(
            target: "casting.auth.jwks",
            key_count = keys.len(),
            "JWKS cache refreshed"
        );

        let mut cache = self.cache.write().await;
        *cache = Some(CachedJwks {
            keys,
            expires_at: Instant::now() + self.cache_ttl,
        });

        Ok(())
    }

    async fn fetch_keys(&self) -> Result<HashMap<String, Jwk>, AuthError> {
        let response = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(target: "casting.auth.jwks", error = %e, timeout = e.is_timeout(), "Failed to fetch JWKS");
                AuthError::KeyFetchFailed
            })?;

        if !response.status().is_success() {
            tracing::error!(
                target: "casting.auth.jwks",
                status = %response.status(),
                "JWKS endpoint returned error"
            );
            return Err(AuthError::KeyFetchFailed);
        }

        let jwks: JwksResponse = response.json().await.map_err(|e| {
            tracing::error!(target: "casting.auth.jwks", error = %e, "Failed to parse JWKS response");
            AuthError::KeyFetchFailed
        })?;

        Ok(jwks
            .keys
            .into_iter()
            .map(|key| (key.kid.clone(), key))
            .collect())
    }

    /// Clear the cache.
    #[cfg(test)]
    pub async fn clear_cache(&self) {
        let mut cache = self.cache.write().await;
        *cache = None;
    }
}

#[async_trait::async_trait]
impl KeyProvider for JwksClient {
    #[instrument(skip(self), fields(kid = %kid))]
    async fn get_key(&self, kid: &str) -> Result<Jwk, AuthError> {
        match self.lookup(kid).await {
            CacheLookup::Hit(key) => {
                tracing::debug!(target: "casting.auth.jwks", kid = %kid, "JWKS cache hit");
                return Ok(key);
            }
            CacheLookup::Miss => {
                tracing::debug!(target: "casting.auth.jwks", kid = %kid, "Key not in JWKS cache, refreshing");
            }
            CacheLookup::Stale => {
                tracing::debug!(target: "casting.auth.jwks", "JWKS cache empty or expired");
            }
        }

        self.refresh_cache().await?;

        // The key set was just fetched, so expiry is not consulted here
        let cache = self.cache.read().await;
        match cache.as_ref().and_then(|cached| cached.keys.get(kid)) {
            Some(key) => Ok(key.clone()),
            None => {
                tracing::warn!(target: "casting.auth.jwks", kid = %kid, "Key not found in JWKS after refresh");
                Err(AuthError::KeyNotFound)
            }
        }
    }
}
