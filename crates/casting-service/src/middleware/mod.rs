//! HTTP middleware for the casting service.
//!
//! # Components
//!
//! - `auth` - Per-route permission check running the auth gate
//! - `http_metrics` - Request/response metrics for every route

pub mod auth;
pub mod http_metrics;

pub use auth::{require_permission, ClaimsExt, PermissionState};
pub use http_metrics::http_metrics_middleware;
