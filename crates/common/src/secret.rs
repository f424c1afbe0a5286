//! Redacting wrappers for sensitive configuration values.
//!
//! Re-exports [`secrecy`] so that service crates hold connection strings and
//! raw bearer tokens in types whose `Debug` output is redacted. A struct that
//! derives `Debug` over a `SecretString` field cannot leak it through
//! `{:?}` or a tracing field.
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! let database_url = SecretString::from("postgres://casting:pw@db/casting");
//! assert!(!format!("{database_url:?}").contains("pw@"));
//! assert!(database_url.expose_secret().starts_with("postgres://"));
//! ```

pub use secrecy::{ExposeSecret, SecretString};
