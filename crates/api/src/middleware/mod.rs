//! Request extractors.
//!
//! - [`auth::Caller`] -- Resolves the caller identity from an optional Bearer token.

pub mod auth;
