//! # Curio Shared Library
//!
//! This crate contains shared types, utilities, and business logic used by
//! the Curio API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Authentication utilities (JWT, password hashing, middleware)
//! - `share`: Share code generation for public collection views
//! - `db`: Connection pool and migration runner

pub mod auth;
pub mod db;
pub mod models;
pub mod share;

/// Current version of the Curio shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
