//! The authorization gate in front of every protected operation.
//!
//! Composes the extractor, verifier, and scope check, then runs the
//! protected operation only when all of them succeed.

use crate::auth::extractor::extract_bearer_token;
use crate::auth::jwt::TokenVerifier;
use crate::auth::scope::{has_scope, Requirement};
use crate::auth::{AuthError, Claims};
use crate::observability::metrics::record_auth_outcome;
use axum::http::HeaderMap;
use std::future::Future;
use std::sync::Arc;
use tracing::instrument;

/// Extract, verify, authorize.
pub struct AuthGate {
    verifier: Arc<TokenVerifier>,
}

impl AuthGate {
    pub fn new(verifier: Arc<TokenVerifier>) -> Self {
        Self { verifier }
    }

    /// Run the authorization chain for a request without an operation.
    ///
    /// # Errors
    ///
    /// Extraction and verification failures (401), or `Forbidden` (403)
    /// when the verified token lacks the required scope.
    #[instrument(skip_all, name = "casting.auth.gate", fields(requirement = requirement.as_str()))]
    pub async fn authorize(
        &self,
        headers: &HeaderMap,
        requirement: Requirement,
    ) -> Result<Claims, AuthError> {
        let result = self.check(headers, requirement).await;

        match &result {
            Ok(_) => {
                record_auth_outcome("success");
                tracing::debug!(target: "casting.auth.gate", "Request authorized");
            }
            Err(e) => {
                record_auth_outcome(e.code());
                tracing::debug!(target: "casting.auth.gate", code = e.code(), "Request rejected");
            }
        }

        result
    }

    /// Authorize, then invoke `operation` exactly once with the verified
    /// claims and return its result unchanged.
    ///
    /// On any authorization failure `operation` is never invoked.
    pub async fn run<F, Fut, T, E>(
        &self,
        headers: &HeaderMap,
        requirement: Requirement,
        operation: F,
    ) -> Result<T, E>
    where
        F: FnOnce(Claims) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<AuthError>,
    {
        let claims = self.authorize(headers, requirement).await?;
        operation(claims).await
    }

    async fn check(
        &self,
        headers: &HeaderMap,
        requirement: Requirement,
    ) -> Result<Claims, AuthError> {
        let token = extract_bearer_token(headers)?;
        let claims = self.verifier.verify(token).await?;

        match requirement {
            Requirement::Authenticated => Ok(claims),
            Requirement::Scope(scope) if has_scope(&claims, scope) => Ok(claims),
            Requirement::Scope(scope) => {
                tracing::debug!(target: "casting.auth.gate", required = scope, "Missing required scope");
                Err(AuthError::Forbidden)
            }
        }
    }
}
