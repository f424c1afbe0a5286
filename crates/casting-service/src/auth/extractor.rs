//! Bearer token extraction from the `Authorization` header.

use crate::auth::AuthError;
use axum::http::{header::AUTHORIZATION, HeaderMap};

/// Pull the bearer token out of a request's headers.
///
/// The header value is split on whitespace and must consist of exactly two
/// parts: the scheme `Bearer` (any case) and the token. The token is
/// returned verbatim; nothing is decoded here.
///
/// # Errors
///
/// - `MissingHeader` if there is no `Authorization` header
/// - `MalformedHeader` if the scheme is wrong, the token is missing, or
///   there is trailing content
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers.get(AUTHORIZATION).ok_or_else(|| {
        tracing::debug!(target: "casting.auth.extractor", "Missing Authorization header");
        AuthError::MissingHeader
    })?;

    let value = value.to_str().map_err(|_| {
        tracing::debug!(target: "casting.auth.extractor", "Authorization header is not visible ASCII");
        AuthError::MalformedHeader("Authorization header must start with Bearer")
    })?;

    let mut parts = value.split_whitespace();

    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), _, _) if !scheme.eq_ignore_ascii_case("bearer") => {
            tracing::debug!(target: "casting.auth.extractor", "Authorization scheme is not Bearer");
            Err(AuthError::MalformedHeader(
                "Authorization header must start with Bearer",
            ))
        }
        (Some(_), Some(token), None) => Ok(token),
        (Some(_), None, _) => {
            tracing::debug!(target: "casting.auth.extractor", "Bearer token missing");
            Err(AuthError::MalformedHeader("Token not found"))
        }
        (Some(_), Some(_), Some(_)) => {
            tracing::debug!(target: "casting.auth.extractor", "Authorization header has extra content");
            Err(AuthError::MalformedHeader(
                "Authorization header must be Bearer token",
            ))
        }
        (None, _, _) => {
            tracing::debug!(target: "casting.auth.extractor", "Authorization header is empty");
            Err(AuthError::MalformedHeader(
                "Authorization header must start with Bearer",
            ))
        }
    }
}
