/// Database models for Verto
///
/// Each submodule owns one table: the row struct, its input types, and
/// the CRUD operations as static async fns taking a `&PgPool`. Domain
/// rules that span tables (access scoping, invite validation, activity
/// summaries) live in [`crate::access`], [`crate::invites`], and
/// [`crate::activity`].
///
/// # Models
///
/// - `user`: accounts and profiles
/// - `project`: projects ("clients") with owner-scoped slugs
/// - `membership`: user↔project roles
/// - `invite`: single-use collaboration invites
/// - `activity`: append-only activity log
/// - `release`: per-environment release state
/// - `transaction_event`: business event code catalogue

pub mod activity;
pub mod invite;
pub mod membership;
pub mod project;
pub mod release;
pub mod transaction_event;
pub mod user;
