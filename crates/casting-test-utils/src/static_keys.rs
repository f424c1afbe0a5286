//! In-process key provider double.

use crate::crypto_fixtures::TestKeypair;
use casting_service::auth::{AuthError, Jwk, KeyProvider};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Key provider serving a fixed key set with no network.
///
/// Counts lookups so tests can assert the verifier did (or did not) ask.
pub struct StaticKeys {
    keys: HashMap<String, Jwk>,
    lookups: AtomicUsize,
}

impl StaticKeys {
    pub fn new(keys: &[&TestKeypair]) -> Self {
        Self {
            keys: keys.iter().map(|k| (k.kid.clone(), k.jwk())).collect(),
            lookups: AtomicUsize::new(0),
        }
    }

    /// Publishes only the primary fixture key.
    pub fn primary() -> Arc<Self> {
        Arc::new(Self::new(&[&TestKeypair::primary()]))
    }

    /// Publishes a raw JWK as-is (for malformed key tests).
    pub fn with_jwk(jwk: Jwk) -> Arc<Self> {
        Arc::new(Self {
            keys: HashMap::from([(jwk.kid.clone(), jwk)]),
            lookups: AtomicUsize::new(0),
        })
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl KeyProvider for StaticKeys {
    async fn get_key(&self, kid: &str) -> Result<Jwk, AuthError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.keys.get(kid).cloned().ok_or(AuthError::KeyNotFound)
    }
}
