//! Bearer-token authorization.
//!
//! ```text
//! request -> extractor -> jwt (keys from jwks) -> scope -> protected operation
//!            \___________________ gate ___________________/
//! ```
//!
//! # Modules
//!
//! - `extractor` - pulls the bearer token from the `Authorization` header
//! - `jwks` - fetches and caches the issuer's signing keys
//! - `jwt` - RS256 signature and claim verification
//! - `scope` - scope membership check
//! - `gate` - composes the above around a protected operation

pub mod claims;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod jwks;
pub mod jwt;
pub mod scope;

pub use claims::{Audience, Claims};
pub use error::AuthError;
pub use extractor::extract_bearer_token;
pub use gate::AuthGate;
pub use jwks::{Jwk, JwksClient, KeyProvider};
pub use jwt::TokenVerifier;
pub use scope::{has_scope, scopes, Requirement};
