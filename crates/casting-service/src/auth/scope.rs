//! Scope authorization.
//!
//! A required scope is granted iff it appears verbatim as one of the
//! whitespace-separated entries of the token's `scope` claim. There is no
//! prefix, wildcard, or hierarchy matching.

use crate::auth::Claims;

/// Permission scopes used by the casting API routes.
pub mod scopes {
    pub const CREATE_MOVIE: &str = "create:movie";
    pub const UPDATE_MOVIE: &str = "update:movie";
    pub const DELETE_MOVIE: &str = "delete:movie";
    pub const CREATE_ACTOR: &str = "create:actor";
    pub const UPDATE_ACTOR: &str = "update:actor";
    pub const DELETE_ACTOR: &str = "delete:actor";
}

/// What a protected operation demands of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Any caller presenting a valid token.
    Authenticated,

    /// A valid token whose `scope` claim contains this entry.
    Scope(&'static str),
}

impl Requirement {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Requirement::Authenticated => "authenticated",
            Requirement::Scope(scope) => scope,
        }
    }
}

/// Decide whether verified claims grant `required`.
///
/// Never fails: a missing or empty `scope` claim simply grants nothing.
pub fn has_scope(claims: &Claims, required: &str) -> bool {
    match claims.scope.as_deref() {
        Some(granted) if !granted.is_empty() => {
            granted.split_whitespace().any(|scope| scope == required)
        }
        _ => false,
    }
}
