//! Classified authentication and authorization failures.
//!
//! Every variant maps to a stable machine-readable code and an HTTP status.
//! Descriptions are fixed strings: the underlying cause is logged at the
//! point of failure and never echoed to the caller.

use thiserror::Error;

/// Failure of the bearer-token authorization chain.
///
/// All variants except `Forbidden` are 401: the caller could not be
/// authenticated. `Forbidden` is 403: the caller is authenticated but the
/// token does not carry the required scope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authorization header is expected")]
    MissingHeader,

    #[error("{0}")]
    MalformedHeader(&'static str),

    #[error("Unable to parse authentication token")]
    MalformedToken,

    #[error("Token signing algorithm is not supported")]
    UnsupportedAlgorithm,

    #[error("Unable to find appropriate key")]
    KeyNotFound,

    #[error("Unable to fetch signing keys")]
    KeyFetchFailed,

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    TokenExpired,

    #[error("Incorrect claims, please check the audience and issuer")]
    InvalidClaims,

    #[error("You don't have the necessary privileges to perform this action")]
    Forbidden,
}

impl AuthError {
    /// Machine-readable error code returned in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingHeader => "authorization_header_missing",
            AuthError::MalformedHeader(_) => "invalid_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::UnsupportedAlgorithm => "unsupported_algorithm",
            AuthError::KeyNotFound => "key_not_found",
            AuthError::KeyFetchFailed => "key_fetch_failed",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims => "invalid_claims",
            AuthError::Forbidden => "forbidden",
        }
    }

    /// HTTP status code for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::Forbidden => 403,
            _ => 401,
        }
    }
}
