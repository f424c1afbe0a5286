//! Utilities shared between the casting service and its test utilities.

#![warn(clippy::pedantic)]

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for JWT header inspection and size limits
pub mod jwt;
