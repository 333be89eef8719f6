/// Transaction event model and database operations
///
/// Transaction events catalogue the business event codes a client's
/// integration emits ("PET-1043: payment settled"). The display code
/// keeps the user's casing; `code_key` is its normalized form and is
/// globally unique across all projects.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE transaction_events (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     code VARCHAR(255) NOT NULL,
///     code_key VARCHAR(255) NOT NULL UNIQUE,
///     description TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Transaction event row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TransactionEvent {
    /// Unique event ID
    pub id: Uuid,

    /// Owning project
    pub project_id: Uuid,

    /// Display code as entered
    pub code: String,

    /// Normalized code, globally unique
    pub code_key: String,

    /// Human description of the event
    pub description: String,

    /// When the event was created
    pub created_at: DateTime<Utc>,

    /// When the event was last updated
    pub updated_at: DateTime<Utc>,
}

impl TransactionEvent {
    /// Creates a new transaction event
    ///
    /// # Errors
    ///
    /// Returns an error if `code_key` already exists (unique constraint
    /// violation) or the database is unavailable. Callers pre-check the
    /// key for a friendlier Conflict, but a racing insert still lands
    /// here and is translated the same way.
    pub async fn create(
        pool: &PgPool,
        project_id: Uuid,
        code: &str,
        code_key: &str,
        description: &str,
    ) -> Result<Self, sqlx::Error> {
        let event = sqlx::query_as::<_, TransactionEvent>(
            r#"
            INSERT INTO transaction_events (project_id, code, code_key, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, project_id, code, code_key, description, created_at, updated_at
            "#,
        )
        .bind(project_id)
        .bind(code)
        .bind(code_key)
        .bind(description)
        .fetch_one(pool)
        .await?;

        Ok(event)
    }

    /// Finds an event by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let event = sqlx::query_as::<_, TransactionEvent>(
            r#"
            SELECT id, project_id, code, code_key, description, created_at, updated_at
            FROM transaction_events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(event)
    }

    /// Finds an event by its normalized code key
    pub async fn find_by_code_key(
        pool: &PgPool,
        code_key: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let event = sqlx::query_as::<_, TransactionEvent>(
            r#"
            SELECT id, project_id, code, code_key, description, created_at, updated_at
            FROM transaction_events
            WHERE code_key = $1
            "#,
        )
        .bind(code_key)
        .fetch_optional(pool)
        .await?;

        Ok(event)
    }

    /// Rewrites an event's code, project, and description
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        project_id: Uuid,
        code: &str,
        code_key: &str,
        description: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let event = sqlx::query_as::<_, TransactionEvent>(
            r#"
            UPDATE transaction_events
            SET project_id = $2, code = $3, code_key = $4, description = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, project_id, code, code_key, description, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(project_id)
        .bind(code)
        .bind(code_key)
        .bind(description)
        .fetch_optional(pool)
        .await?;

        Ok(event)
    }

    /// Lists events across projects, ordered by display code
    pub async fn list_for_projects(
        pool: &PgPool,
        project_ids: &[Uuid],
    ) -> Result<Vec<Self>, sqlx::Error> {
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }

        let events = sqlx::query_as::<_, TransactionEvent>(
            r#"
            SELECT id, project_id, code, code_key, description, created_at, updated_at
            FROM transaction_events
            WHERE project_id = ANY($1)
            ORDER BY code ASC
            "#,
        )
        .bind(project_ids)
        .fetch_all(pool)
        .await?;

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::normalize_key;

    #[test]
    fn test_code_key_derivation_matches_contract() {
        assert_eq!(normalize_key("PET 1043"), "pet-1043");
        assert_eq!(normalize_key("pet-1043"), "pet-1043");
    }
}
