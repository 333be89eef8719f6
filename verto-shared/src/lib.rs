//! # Verto Shared Library
//!
//! Shared types, data access, and domain operations for the Verto
//! release-tracking service. The API server is a thin HTTP layer over
//! this crate.
//!
//! ## Module Organization
//!
//! - `models`: database models and row-level operations
//! - `keys`: canonical key/slug derivation
//! - `access`: access-scoped project operations (owner OR member)
//! - `invites`: single-use invitation lifecycle
//! - `activity`: activity feed recording and views
//! - `auth`: password hashing, JWT sessions, request middleware
//! - `email`: SMTP mailer for invites and release notifications
//! - `db`: connection pool and migrations

pub mod access;
pub mod activity;
pub mod auth;
pub mod db;
pub mod email;
pub mod invites;
pub mod keys;
pub mod models;

/// Current version of the Verto shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
