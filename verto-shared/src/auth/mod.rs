/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength validation
/// - [`jwt`]: HS256 access/refresh session tokens
/// - [`middleware`]: Axum layer that turns a Bearer token into an
///   [`middleware::AuthUser`] request extension
///
/// Invitation tokens are not JWTs — see [`crate::invites`] for their
/// generation and lifecycle.

pub mod jwt;
pub mod middleware;
pub mod password;
