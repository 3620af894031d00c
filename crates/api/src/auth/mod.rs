//! Bearer-token identity.
//!
//! - [`jwt`] -- HS256 token validation and generation.

pub mod jwt;
