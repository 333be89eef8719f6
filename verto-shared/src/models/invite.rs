/// Project invite model and database operations
///
/// One row per (project, invited email): a single-use token with an
/// expiry. Re-inviting the same address replaces the token and expiry
/// in place; consuming an invite deletes the row, so a replayed token
/// simply stops resolving.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE project_invites (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     invited_by UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     email CITEXT NOT NULL,
///     token VARCHAR(64) NOT NULL UNIQUE,
///     expires_at TIMESTAMPTZ NOT NULL,
///     accepted_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (project_id, email)
/// );
/// ```
///
/// Lifecycle rules (self-invite, already-member, expiry validation)
/// live in [`crate::invites`]; this module is plain row access.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Invite row for a (project, email) pair
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectInvite {
    /// Unique invite ID
    pub id: Uuid,

    /// Project the invite grants access to
    pub project_id: Uuid,

    /// User who sent the invite
    pub invited_by: Uuid,

    /// Invited email address (normalized)
    pub email: String,

    /// Single-use secret, 64 hex chars
    #[serde(skip_serializing)]
    pub token: String,

    /// When the token stops being valid
    pub expires_at: DateTime<Utc>,

    /// Acceptance marker; a set value invalidates the token
    pub accepted_at: Option<DateTime<Utc>>,

    /// When the invite row was first created
    pub created_at: DateTime<Utc>,
}

impl ProjectInvite {
    /// True if the invite's expiry lies in the past
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// Creates or replaces the invite for (project, email)
    ///
    /// A fresh token and expiry always overwrite whatever was there,
    /// and any prior acceptance marker is cleared — re-inviting resets
    /// the pending state. Two concurrent calls for the same pair race
    /// on the unique constraint and both land on this row.
    pub async fn upsert(
        pool: &PgPool,
        project_id: Uuid,
        invited_by: Uuid,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        let invite = sqlx::query_as::<_, ProjectInvite>(
            r#"
            INSERT INTO project_invites (project_id, invited_by, email, token, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (project_id, email)
            DO UPDATE SET invited_by = EXCLUDED.invited_by,
                          token = EXCLUDED.token,
                          expires_at = EXCLUDED.expires_at,
                          accepted_at = NULL
            RETURNING id, project_id, invited_by, email, token, expires_at,
                      accepted_at, created_at
            "#,
        )
        .bind(project_id)
        .bind(invited_by)
        .bind(email)
        .bind(token)
        .bind(expires_at)
        .fetch_one(pool)
        .await?;

        Ok(invite)
    }

    /// Finds an invite by exact token match
    pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<Self>, sqlx::Error> {
        let invite = sqlx::query_as::<_, ProjectInvite>(
            r#"
            SELECT id, project_id, invited_by, email, token, expires_at,
                   accepted_at, created_at
            FROM project_invites
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(invite)
    }

    /// Finds the invite for a (project, email) pair
    pub async fn find_by_project_and_email(
        pool: &PgPool,
        project_id: Uuid,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let invite = sqlx::query_as::<_, ProjectInvite>(
            r#"
            SELECT id, project_id, invited_by, email, token, expires_at,
                   accepted_at, created_at
            FROM project_invites
            WHERE project_id = $1 AND email = $2
            "#,
        )
        .bind(project_id)
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(invite)
    }

    /// Deletes an invite row (consumption or revocation)
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM project_invites WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_is_expired() {
        let now = Utc::now();
        let invite = ProjectInvite {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            invited_by: Uuid::new_v4(),
            email: "b@co.com".to_string(),
            token: "0".repeat(64),
            expires_at: now - Duration::hours(1),
            accepted_at: None,
            created_at: now - Duration::hours(73),
        };

        assert!(invite.is_expired(now));
        assert!(!invite.is_expired(now - Duration::hours(2)));
    }
}
