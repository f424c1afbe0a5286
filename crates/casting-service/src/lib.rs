//! Casting Service Library
//!
//! A movies/actors API whose every protected operation sits behind a bearer
//! token authorization gate:
//!
//! - Bearer token extraction from the `Authorization` header
//! - RS256 signature verification against the issuer's cached JWKS
//! - Expiry, audience, and issuer checks
//! - Per-route scope enforcement (`create:movie`, `delete:actor`, ...)
//!
//! # Architecture
//!
//! ```text
//! routes/mod.rs -> middleware/auth.rs (auth::gate) -> handlers/*.rs -> repositories/*.rs
//! ```
//!
//! # Modules
//!
//! - `auth` - Token extraction, key set cache, verification, scopes, gate
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - Permission and metrics middleware
//! - `models` - Entities, request bodies, responses
//! - `observability` - Prometheus metrics
//! - `repositories` - In-memory and PostgreSQL entity stores
//! - `routes` - Axum router setup

pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
