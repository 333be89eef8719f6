/// Database layer for Verto
///
/// This module provides PostgreSQL connectivity:
///
/// - `pool`: connection pool creation and health checking
/// - `migrations`: schema migration runner built on sqlx migrations
///
/// All model operations in [`crate::models`] take a `&PgPool` created
/// here; no other part of the system opens database connections.

pub mod migrations;
pub mod pool;

pub use pool::{create_pool, health_check, DatabaseConfig};
