//! JWT primitives shared by the casting service and its test utilities.
//!
//! This module provides:
//! - A size limit applied before any parsing
//! - Inspection of the unverified JOSE header (`alg`, `kid`)
//! - The single signing algorithm accepted for access tokens
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing
//! - Nothing returned here is trusted: the header only selects a key, the
//!   signature must still be verified against it
//! - Error messages are generic; details are logged at debug level

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum allowed JWT size in bytes (8KB).
///
/// Typical access tokens are under 2KB. Anything larger is rejected before
/// base64 decoding or signature work is attempted.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// The only signing algorithm accepted for access tokens.
pub const ALLOWED_ALGORITHM: &str = "RS256";

// =============================================================================
// Error Types
// =============================================================================

/// Errors produced while inspecting an unverified JWT header.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtHeaderError {
    /// Token size exceeds [`MAX_JWT_SIZE_BYTES`].
    #[error("Unable to parse authentication token")]
    TokenTooLarge,

    /// Not three dot-separated segments, bad base64, or bad JSON.
    #[error("Unable to parse authentication token")]
    MalformedToken,

    /// Header has no `alg` string.
    #[error("Unable to parse authentication token")]
    MissingAlg,

    /// Header has no non-empty `kid` string.
    #[error("Unable to parse authentication token")]
    MissingKid,
}

// =============================================================================
// Header Types
// =============================================================================

/// The parts of a JOSE header needed to pick a verification key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnverifiedHeader {
    /// Declared signing algorithm, verbatim (e.g. `"RS256"`, `"none"`).
    pub alg: String,

    /// Key identifier used to look the key up in the issuer's key set.
    pub kid: String,
}

impl UnverifiedHeader {
    /// Whether the declared algorithm is [`ALLOWED_ALGORITHM`].
    #[must_use]
    pub fn uses_allowed_algorithm(&self) -> bool {
        self.alg == ALLOWED_ALGORITHM
    }
}

#[derive(Deserialize)]
struct RawHeader {
    #[serde(default)]
    alg: Option<serde_json::Value>,
    #[serde(default)]
    kid: Option<serde_json::Value>,
}

// =============================================================================
// Functions
// =============================================================================

/// Parse the JOSE header of a compact JWT without verifying the signature.
///
/// `alg` is returned as a raw string so that algorithms unknown to the JWT
/// library (`"none"`, `"HS999"`) can still be reported as unsupported rather
/// than as parse failures.
///
/// # Errors
///
/// - `TokenTooLarge` - token exceeds [`MAX_JWT_SIZE_BYTES`]
/// - `MalformedToken` - wrong segment count, bad base64, or bad JSON
/// - `MissingAlg` - `alg` absent or not a string
/// - `MissingKid` - `kid` absent, empty, or not a string
pub fn inspect_header(token: &str) -> Result<UnverifiedHeader, JwtHeaderError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtHeaderError::TokenTooLarge);
    }

    let mut parts = token.split('.');
    let (Some(header_part), Some(_), Some(_), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        tracing::debug!(target: "common.jwt", "Token rejected: invalid JWT format");
        return Err(JwtHeaderError::MalformedToken);
    };

    let header_bytes = URL_SAFE_NO_PAD.decode(header_part).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to decode JWT header base64");
        JwtHeaderError::MalformedToken
    })?;

    let raw: RawHeader = serde_json::from_slice(&header_bytes).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to parse JWT header JSON");
        JwtHeaderError::MalformedToken
    })?;

    let alg = raw
        .alg
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .map(ToString::to_string)
        .ok_or(JwtHeaderError::MissingAlg)?;

    let kid = raw
        .kid
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .ok_or(JwtHeaderError::MissingKid)?;

    Ok(UnverifiedHeader { alg, kid })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn token_with_header(header: &str) -> String {
        format!("{}.payload.signature", URL_SAFE_NO_PAD.encode(header))
    }

    #[test]
    fn test_max_jwt_size_is_8kb() {
        assert_eq!(MAX_JWT_SIZE_BYTES, 8192);
    }

    #[test]
    fn test_inspect_header_valid_token() {
        let token = token_with_header(r#"{"alg":"RS256","typ":"JWT","kid":"key-01"}"#);

        let header = inspect_header(&token).unwrap();
        assert_eq!(header.alg, "RS256");
        assert_eq!(header.kid, "key-01");
        assert!(header.uses_allowed_algorithm());
    }

    #[test]
    fn test_inspect_header_keeps_unknown_algorithms() {
        let token = token_with_header(r#"{"alg":"none","kid":"key-01"}"#);

        let header = inspect_header(&token).unwrap();
        assert_eq!(header.alg, "none");
        assert!(!header.uses_allowed_algorithm());
    }

    #[test]
    fn test_inspect_header_algorithm_is_case_sensitive() {
        let token = token_with_header(r#"{"alg":"rs256","kid":"key-01"}"#);

        let header = inspect_header(&token).unwrap();
        assert!(!header.uses_allowed_algorithm());
    }

    #[test]
    fn test_inspect_header_missing_kid() {
        let token = token_with_header(r#"{"alg":"RS256","typ":"JWT"}"#);
        assert_eq!(inspect_header(&token), Err(JwtHeaderError::MissingKid));
    }

    #[test]
    fn test_inspect_header_empty_kid() {
        let token = token_with_header(r#"{"alg":"RS256","kid":""}"#);
        assert_eq!(inspect_header(&token), Err(JwtHeaderError::MissingKid));
    }

    #[test]
    fn test_inspect_header_numeric_kid() {
        let token = token_with_header(r#"{"alg":"RS256","kid":12345}"#);
        assert_eq!(inspect_header(&token), Err(JwtHeaderError::MissingKid));
    }

    #[test]
    fn test_inspect_header_missing_alg() {
        let token = token_with_header(r#"{"kid":"key-01"}"#);
        assert_eq!(inspect_header(&token), Err(JwtHeaderError::MissingAlg));
    }

    #[test]
    fn test_inspect_header_wrong_segment_count() {
        for token in ["", "single", "only.two", "one.two.three.four"] {
            assert_eq!(
                inspect_header(token),
                Err(JwtHeaderError::MalformedToken),
                "token {token:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_inspect_header_invalid_base64() {
        assert_eq!(
            inspect_header("!!!invalid!!!.payload.signature"),
            Err(JwtHeaderError::MalformedToken)
        );
    }

    #[test]
    fn test_inspect_header_invalid_json() {
        let token = token_with_header("not-json");
        assert_eq!(inspect_header(&token), Err(JwtHeaderError::MalformedToken));
    }

    #[test]
    fn test_inspect_header_oversized_token() {
        let oversized = "a".repeat(MAX_JWT_SIZE_BYTES + 1);
        assert_eq!(
            inspect_header(&oversized),
            Err(JwtHeaderError::TokenTooLarge)
        );
    }

    #[test]
    fn test_inspect_header_at_size_limit() {
        let header_b64 = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","kid":"key"}"#);
        let remaining = MAX_JWT_SIZE_BYTES - header_b64.len() - 2;
        let payload_len = remaining / 2;
        let token = format!(
            "{}.{}.{}",
            header_b64,
            "a".repeat(payload_len),
            "b".repeat(remaining - payload_len)
        );
        assert_eq!(token.len(), MAX_JWT_SIZE_BYTES);

        let header = inspect_header(&token).expect("token at the limit is accepted");
        assert_eq!(header.kid, "key");
    }

    #[test]
    fn test_error_messages_are_generic() {
        for err in [
            JwtHeaderError::TokenTooLarge,
            JwtHeaderError::MalformedToken,
            JwtHeaderError::MissingAlg,
            JwtHeaderError::MissingKid,
        ] {
            assert_eq!(err.to_string(), "Unable to parse authentication token");
        }
    }
}
