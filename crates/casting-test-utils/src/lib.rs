//! # Casting Test Utilities
//!
//! Shared test utilities for the casting service.
//!
//! This crate provides:
//! - Fixed RSA keypairs with their JWK form (`TestKeypair`)
//! - Claim builders (`TestTokenBuilder`)
//! - A wiremock-backed JWKS endpoint (`TestJwksServer`)
//! - An in-process key provider double (`StaticKeys`)
//! - Server test harness (`TestCastingServer` for E2E tests)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use casting_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let server = TestCastingServer::spawn(StaticKeys::primary()).await?;
//!     let token = TestTokenBuilder::new()
//!         .with_scope("create:actor")
//!         .sign_with(&TestKeypair::primary());
//!
//!     let response = reqwest::Client::new()
//!         .get(format!("{}/actors", server.url()))
//!         .bearer_auth(token)
//!         .send()
//!         .await?;
//!
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod crypto_fixtures;
pub mod jwks_server;
pub mod server_harness;
pub mod static_keys;
pub mod token_builders;

// Re-export commonly used items
pub use crypto_fixtures::*;
pub use jwks_server::*;
pub use server_harness::*;
pub use static_keys::*;
pub use token_builders::*;
