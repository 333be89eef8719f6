/// Activity recorder operations
///
/// Builds the dashboard-facing views of the append-only activity log:
/// per-user summaries across every accessible project and the full
/// feed for a single project. Appending goes through
/// [`record_activity`], which also refreshes the project's
/// denormalized last-update pointer (see
/// [`crate::models::activity::ActivityLogEntry::append`]).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::activity::{ActivityAction, ActivityLogEntry};
use crate::models::project::Project;
use crate::models::user::User;

/// Default number of recent entries per project in the summary view
pub const DEFAULT_SUMMARY_LOG_LIMIT: i64 = 10;

/// Default number of entries in a single-project feed
pub const DEFAULT_PROJECT_LOG_LIMIT: i64 = 50;

/// Error type for activity operations
#[derive(Debug, thiserror::Error)]
pub enum ActivityError {
    /// Project is unknown or not accessible to the caller
    #[error("Project not found")]
    ProjectNotFound,

    /// Underlying database error
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// User reference rendered in activity feeds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityUser {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
}

impl ActivityUser {
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
        }
    }
}

/// One rendered feed entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntryView {
    pub id: i64,
    pub action: String,
    pub created_at: DateTime<Utc>,
    pub metadata: Option<JsonValue>,
    pub user: Option<ActivityUser>,
}

/// Activity summary for one project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectActivitySummary {
    pub project_id: Uuid,
    pub name: String,
    pub slug: String,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub last_updated_by: Option<ActivityUser>,
    pub recent_logs: Vec<ActivityEntryView>,
}

/// Appends one activity entry for a project mutation
///
/// `user_id` is None for system-originated changes. Thin wrapper over
/// the model append so callers outside this crate never touch the
/// table directly.
pub async fn record_activity(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Option<Uuid>,
    action: ActivityAction,
    metadata: Option<JsonValue>,
) -> Result<ActivityLogEntry, ActivityError> {
    Ok(ActivityLogEntry::append(pool, project_id, user_id, action, metadata).await?)
}

/// Activity summaries for every project accessible to the user
///
/// Keyed by project slug. Users with no accessible projects get an
/// empty map, not an error.
pub async fn activity_summaries(
    pool: &PgPool,
    user_id: Uuid,
    log_limit: Option<i64>,
) -> Result<HashMap<String, ProjectActivitySummary>, ActivityError> {
    let project_ids = Project::accessible_ids(pool, user_id).await?;
    if project_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let log_limit = log_limit.unwrap_or(DEFAULT_SUMMARY_LOG_LIMIT);
    let projects = Project::list_by_ids(pool, &project_ids).await?;

    let mut summaries = HashMap::with_capacity(projects.len());
    for project in projects {
        let summary = build_summary(pool, &project, log_limit).await?;
        summaries.insert(project.slug.clone(), summary);
    }

    Ok(summaries)
}

/// Activity feed for a single project, by slug
///
/// # Errors
///
/// `ActivityError::ProjectNotFound` when the slug doesn't resolve for
/// this user — unknown and inaccessible are deliberately the same
/// answer here.
pub async fn project_activity(
    pool: &PgPool,
    user_id: Uuid,
    slug: &str,
    log_limit: Option<i64>,
) -> Result<ProjectActivitySummary, ActivityError> {
    let project = Project::find_accessible_by_slug(pool, user_id, slug)
        .await?
        .ok_or(ActivityError::ProjectNotFound)?;

    build_summary(pool, &project, log_limit.unwrap_or(DEFAULT_PROJECT_LOG_LIMIT)).await
}

async fn build_summary(
    pool: &PgPool,
    project: &Project,
    log_limit: i64,
) -> Result<ProjectActivitySummary, ActivityError> {
    let entries = ActivityLogEntry::recent_for_project(pool, project.id, log_limit).await?;
    let recent_logs = resolve_entry_users(pool, entries).await?;

    let last_updated_by = match project.last_updated_by {
        Some(id) => User::find_by_id(pool, id)
            .await?
            .map(|u| ActivityUser::from_user(&u)),
        None => None,
    };

    Ok(ProjectActivitySummary {
        project_id: project.id,
        name: project.name.clone(),
        slug: project.slug.clone(),
        last_updated_at: project.last_activity_at,
        last_updated_by,
        recent_logs,
    })
}

/// Resolves the acting users for a batch of entries in one query
async fn resolve_entry_users(
    pool: &PgPool,
    entries: Vec<ActivityLogEntry>,
) -> Result<Vec<ActivityEntryView>, ActivityError> {
    let mut user_ids: Vec<Uuid> = entries.iter().filter_map(|e| e.user_id).collect();
    user_ids.sort();
    user_ids.dedup();

    let users: HashMap<Uuid, ActivityUser> = if user_ids.is_empty() {
        HashMap::new()
    } else {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, display_name, avatar_url, job_title,
                   location, bio, phone_number, created_at, updated_at
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(&user_ids)
        .fetch_all(pool)
        .await?
        .iter()
        .map(|u| (u.id, ActivityUser::from_user(u)))
        .collect()
    };

    Ok(entries
        .into_iter()
        .map(|entry| ActivityEntryView {
            id: entry.id,
            action: entry.action,
            created_at: entry.created_at,
            metadata: entry.metadata,
            user: entry.user_id.and_then(|id| users.get(&id).cloned()),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        assert_eq!(DEFAULT_SUMMARY_LOG_LIMIT, 10);
        assert_eq!(DEFAULT_PROJECT_LOG_LIMIT, 50);
    }

    // Feed ordering and scoping are covered by the integration tests
    // in tests/.
}
