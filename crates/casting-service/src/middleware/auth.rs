//! Authorization middleware for protected routes.
//!
//! Runs the [`AuthGate`] for the route's [`Requirement`] and injects the
//! verified claims into request extensions for handlers.

use crate::auth::{AuthGate, Claims, Requirement};
use crate::errors::ApiError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::instrument;

/// State for one route's permission check.
#[derive(Clone)]
pub struct PermissionState {
    pub gate: Arc<AuthGate>,
    pub requirement: Requirement,
}

/// Middleware that authorizes the request before the handler runs.
///
/// # Authorization Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// # Response
///
/// - 401 with `WWW-Authenticate` if the token is missing or invalid
/// - 403 if the token lacks the route's scope
/// - Otherwise continues to the handler with [`Claims`] in extensions
#[instrument(skip_all, name = "casting.middleware.auth", fields(requirement = state.requirement.as_str()))]
pub async fn require_permission(
    State(state): State<PermissionState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let headers = req.headers().clone();

    state
        .gate
        .run(&headers, state.requirement, |claims| async move {
            let mut req = req;
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        })
        .await
}

/// Extension trait for extracting claims from request.
pub trait ClaimsExt {
    /// Get the authenticated claims from request extensions.
    ///
    /// Returns `None` if the permission middleware was not applied.
    fn claims(&self) -> Option<&Claims>;
}

impl<B> ClaimsExt for axum::extract::Request<B> {
    fn claims(&self) -> Option<&Claims> {
        self.extensions().get::<Claims>()
    }
}
