/// Activity log model and database operations
///
/// Append-only audit trail of project mutations. Every append also
/// refreshes the owning project's denormalized `last_updated_by` /
/// `last_activity_at` pointers, in the same transaction, so the
/// dashboard header never disagrees with the feed below it.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE project_activity_logs (
///     id BIGSERIAL PRIMARY KEY,
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     action VARCHAR(60) NOT NULL,
///     metadata JSONB,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Entries are never updated or deleted individually; they only go
/// away when their project is deleted (cascade). The BIGSERIAL id
/// doubles as the tiebreaker when two entries share a timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

/// Closed set of recorded project mutations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    /// Project came into existence
    ProjectCreated,

    /// A release row was created or overwritten
    ReleaseUpserted,

    /// A release row was removed
    ReleaseDeleted,

    /// A transaction event was created
    TransactionEventCreated,

    /// A transaction event was updated
    TransactionEventUpdated,
}

impl ActivityAction {
    /// Converts the action to its stored string form
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::ProjectCreated => "project_created",
            ActivityAction::ReleaseUpserted => "release_upserted",
            ActivityAction::ReleaseDeleted => "release_deleted",
            ActivityAction::TransactionEventCreated => "transaction_event_created",
            ActivityAction::TransactionEventUpdated => "transaction_event_updated",
        }
    }

    /// Parses an action from its stored string form
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "project_created" => Some(ActivityAction::ProjectCreated),
            "release_upserted" => Some(ActivityAction::ReleaseUpserted),
            "release_deleted" => Some(ActivityAction::ReleaseDeleted),
            "transaction_event_created" => Some(ActivityAction::TransactionEventCreated),
            "transaction_event_updated" => Some(ActivityAction::TransactionEventUpdated),
            _ => None,
        }
    }
}

/// One immutable entry in a project's activity feed
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ActivityLogEntry {
    /// Monotonic entry ID (insertion-order tiebreaker)
    pub id: i64,

    /// Project the entry belongs to
    pub project_id: Uuid,

    /// Acting user; None once the account is deleted or for system actions
    pub user_id: Option<Uuid>,

    /// Stored action kind; see [`ActivityAction`]
    pub action: String,

    /// Free-form metadata about the mutation
    pub metadata: Option<JsonValue>,

    /// When the entry was appended
    pub created_at: DateTime<Utc>,
}

impl ActivityLogEntry {
    /// Appends one entry and refreshes the project's last-update pointer
    ///
    /// Both writes happen in a single transaction: an entry without the
    /// matching denormalized pointer (or vice versa) is never visible.
    pub async fn append(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Option<Uuid>,
        action: ActivityAction,
        metadata: Option<JsonValue>,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let entry = sqlx::query_as::<_, ActivityLogEntry>(
            r#"
            INSERT INTO project_activity_logs (project_id, user_id, action, metadata)
            VALUES ($1, $2, $3, $4)
            RETURNING id, project_id, user_id, action, metadata, created_at
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .bind(action.as_str())
        .bind(metadata)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE projects
            SET last_updated_by = $2, last_activity_at = NOW(), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(entry)
    }

    /// Returns the most recent entries for a project
    ///
    /// Ordered newest first; ties on `created_at` break by insertion
    /// order via the serial id.
    pub async fn recent_for_project(
        pool: &PgPool,
        project_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let entries = sqlx::query_as::<_, ActivityLogEntry>(
            r#"
            SELECT id, project_id, user_id, action, metadata, created_at
            FROM project_activity_logs
            WHERE project_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(project_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(entries)
    }

    /// Counts entries for a project
    pub async fn count(pool: &PgPool, project_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM project_activity_logs WHERE project_id = $1")
                .bind(project_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_as_str() {
        assert_eq!(ActivityAction::ProjectCreated.as_str(), "project_created");
        assert_eq!(ActivityAction::ReleaseUpserted.as_str(), "release_upserted");
        assert_eq!(ActivityAction::ReleaseDeleted.as_str(), "release_deleted");
        assert_eq!(
            ActivityAction::TransactionEventCreated.as_str(),
            "transaction_event_created"
        );
        assert_eq!(
            ActivityAction::TransactionEventUpdated.as_str(),
            "transaction_event_updated"
        );
    }

    #[test]
    fn test_action_round_trip() {
        for action in [
            ActivityAction::ProjectCreated,
            ActivityAction::ReleaseUpserted,
            ActivityAction::ReleaseDeleted,
            ActivityAction::TransactionEventCreated,
            ActivityAction::TransactionEventUpdated,
        ] {
            assert_eq!(ActivityAction::from_str(action.as_str()), Some(action));
        }

        assert_eq!(ActivityAction::from_str("unknown"), None);
    }
}
