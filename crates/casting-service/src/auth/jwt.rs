//! Access token verification.
//!
//! Validates incoming JWTs using RSA public keys from the issuer's JWKS.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing
//! - Only RS256 is accepted; the declared algorithm is checked before any
//!   key lookup, so `alg: none` and HMAC confusion never reach a key
//! - Signature is verified before any claim is trusted
//! - Expiry, audience, and issuer are checked with no leeway

use crate::auth::claims::Claims;
use crate::auth::jwks::{Jwk, KeyProvider};
use crate::auth::AuthError;
use common::jwt::{inspect_header, JwtHeaderError};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use tracing::instrument;

/// Verifies bearer tokens against the issuer's signing keys.
pub struct TokenVerifier {
    /// Source of public keys, normally a shared [`crate::auth::JwksClient`].
    keys: Arc<dyn KeyProvider>,

    /// Audience that must appear in the token's `aud` claim.
    audience: String,

    /// Exact value required in the token's `iss` claim.
    issuer: String,
}

impl TokenVerifier {
    /// Create a new verifier.
    ///
    /// # Arguments
    ///
    /// * `keys` - Key provider used to resolve the token's `kid`
    /// * `audience` - Required audience (API identifier)
    /// * `issuer` - Required issuer URL
    pub fn new(keys: Arc<dyn KeyProvider>, audience: String, issuer: String) -> Self {
        Self {
            keys,
            audience,
            issuer,
        }
    }

    /// Verify a token and return its claims.
    ///
    /// # Steps
    ///
    /// 1. Parse the unverified header for `kid` and `alg`
    /// 2. Reject any algorithm other than RS256
    /// 3. Resolve the signing key by `kid`
    /// 4. Verify the signature
    /// 5. Check `exp`, then `aud`, then `iss`
    ///
    /// # Errors
    ///
    /// Each step fails with its own [`AuthError`] variant; see the module docs
    /// of [`crate::auth`].
    #[instrument(skip_all, name = "casting.auth.verify")]
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = inspect_header(token).map_err(|e| {
            tracing::debug!(target: "casting.auth.jwt", error = ?e, "Token header inspection failed");
            match e {
                JwtHeaderError::TokenTooLarge
                | JwtHeaderError::MalformedToken
                | JwtHeaderError::MissingAlg
                | JwtHeaderError::MissingKid => AuthError::MalformedToken,
            }
        })?;

        if !header.uses_allowed_algorithm() {
            tracing::debug!(target: "casting.auth.jwt", alg = %header.alg, "Token algorithm rejected");
            return Err(AuthError::UnsupportedAlgorithm);
        }

        let jwk = self.keys.get_key(&header.kid).await?;
        let decoding_key = decoding_key_for(&jwk)?;
        let claims = verify_signature(token, &decoding_key)?;

        validate_claims(
            &claims,
            &self.audience,
            &self.issuer,
            chrono::Utc::now().timestamp(),
        )?;

        tracing::debug!(target: "casting.auth.jwt", "Token verified successfully");
        Ok(claims)
    }
}

/// Build an RS256 decoding key from a JWK.
///
/// A key that is not an RSA signing key, or lacks its modulus or exponent,
/// cannot verify anything and is treated as absent.
fn decoding_key_for(jwk: &Jwk) -> Result<DecodingKey, AuthError> {
    if jwk.kty != "RSA" {
        tracing::warn!(target: "casting.auth.jwt", kid = %jwk.kid, kty = %jwk.kty, "Unexpected JWK key type");
        return Err(AuthError::KeyNotFound);
    }
    if let Some(alg) = &jwk.alg {
        if alg != common::jwt::ALLOWED_ALGORITHM {
            tracing::warn!(target: "casting.auth.jwt", kid = %jwk.kid, alg = %alg, "Unexpected JWK algorithm");
            return Err(AuthError::KeyNotFound);
        }
    }
    if jwk.key_use.as_deref().is_some_and(|key_use| key_use != "sig") {
        tracing::warn!(target: "casting.auth.jwt", kid = %jwk.kid, "JWK is not a signing key");
        return Err(AuthError::KeyNotFound);
    }

    let (Some(n), Some(e)) = (jwk.n.as_deref(), jwk.e.as_deref()) else {
        tracing::error!(target: "casting.auth.jwt", kid = %jwk.kid, "JWK missing modulus or exponent");
        return Err(AuthError::KeyNotFound);
    };

    DecodingKey::from_rsa_components(n, e).map_err(|e| {
        tracing::error!(target: "casting.auth.jwt", kid = %jwk.kid, error = %e, "Invalid RSA key components");
        AuthError::KeyNotFound
    })
}

/// Verify the RS256 signature and decode the payload.
///
/// Claim checks are disabled here; [`validate_claims`] applies them in a
/// fixed order after the signature is known to be good.
fn verify_signature(token: &str, key: &DecodingKey) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let token_data = decode::<Claims>(token, key, &validation).map_err(|e| {
        tracing::debug!(target: "casting.auth.jwt", error = %e, "Token verification failed");
        match e.kind() {
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                AuthError::UnsupportedAlgorithm
            }
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => AuthError::MalformedToken,
            _ => AuthError::InvalidSignature,
        }
    })?;

    Ok(token_data.claims)
}

/// Check registered claims of a signature-verified token against `now`.
///
/// Order: expiry, audience, issuer. `exp` must be strictly greater than
/// `now`.
pub(crate) fn validate_claims(
    claims: &Claims,
    audience: &str,
    issuer: &str,
    now: i64,
) -> Result<(), AuthError> {
    let Some(exp) = claims.exp.as_ref().and_then(serde_json::Number::as_f64) else {
        tracing::debug!(target: "casting.auth.jwt", "Token has no exp claim");
        return Err(AuthError::InvalidClaims);
    };
    if exp <= now as f64 {
        tracing::debug!(target: "casting.auth.jwt", exp, now, "Token expired");
        return Err(AuthError::TokenExpired);
    }

    if !claims.aud.as_ref().is_some_and(|aud| aud.contains(audience)) {
        tracing::debug!(target: "casting.auth.jwt", aud = ?claims.aud, "Token audience mismatch");
        return Err(AuthError::InvalidClaims);
    }

    if claims.iss.as_deref() != Some(issuer) {
        tracing::debug!(target: "casting.auth.jwt", iss = ?claims.iss, "Token issuer mismatch");
        return Err(AuthError::InvalidClaims);
    }

    Ok(())
}
