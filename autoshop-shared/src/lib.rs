//! # Autoshop Shared Library
//!
//! Types, persistence and authentication logic shared by the Autoshop API
//! server.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, tokens, role policy and the authorization gate
//! - `db`: Connection pool and migrations
//! - `models`: Database models and queries

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Autoshop shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
