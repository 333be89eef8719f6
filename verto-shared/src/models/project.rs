/// Project model and database operations
///
/// A project (a "client" in the release dashboard) groups releases,
/// transaction events, memberships, invites, and activity entries
/// under an owning user. The slug is the normalized form of the
/// display name and is unique per owner.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     slug VARCHAR(255) NOT NULL,
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     last_updated_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     last_activity_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (owner_id, slug)
/// );
/// ```
///
/// Access rule: a user can see a project iff they own it or hold a
/// `project_members` row for it. The queries here encode that rule;
/// higher layers never filter projects themselves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::keys::normalize_key;

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID (UUID v4)
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Normalized slug, unique per owner
    pub slug: String,

    /// Owning user
    pub owner_id: Uuid,

    /// Who last changed anything in this project (denormalized)
    pub last_updated_by: Option<Uuid>,

    /// When the project last saw activity (denormalized)
    pub last_activity_at: Option<DateTime<Utc>>,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project row was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    /// Owning user
    pub owner_id: Uuid,

    /// Display name (trimmed by the caller)
    pub name: String,

    /// Normalized slug; callers derive it via [`normalize_key`]
    pub slug: String,
}

impl Project {
    /// Creates a new project
    ///
    /// # Errors
    ///
    /// Returns an error if (owner, slug) already exists (unique
    /// constraint violation) or the database is unavailable.
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (owner_id, name, slug)
            VALUES ($1, $2, $3)
            RETURNING id, name, slug, owner_id, last_updated_by, last_activity_at,
                      created_at, updated_at
            "#,
        )
        .bind(data.owner_id)
        .bind(data.name)
        .bind(data.slug)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, slug, owner_id, last_updated_by, last_activity_at,
                   created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by slug where the user is owner OR member
    ///
    /// The slug argument is normalized before matching, so callers may
    /// pass raw display names. Returns None both when the slug doesn't
    /// exist and when it exists but isn't accessible; callers that need
    /// to distinguish must check ownership separately.
    pub async fn find_accessible_by_slug(
        pool: &PgPool,
        user_id: Uuid,
        slug: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let normalized = normalize_key(slug);

        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT DISTINCT p.id, p.name, p.slug, p.owner_id, p.last_updated_by,
                   p.last_activity_at, p.created_at, p.updated_at
            FROM projects p
            LEFT JOIN project_members m
                   ON m.project_id = p.id AND m.user_id = $1
            WHERE p.slug = $2
              AND (p.owner_id = $1 OR m.user_id IS NOT NULL)
            "#,
        )
        .bind(user_id)
        .bind(normalized)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by slug owned by the given user
    ///
    /// Stricter variant of [`Self::find_accessible_by_slug`] used where
    /// only the owner may act (sending invites).
    pub async fn find_owned_by_slug(
        pool: &PgPool,
        owner_id: Uuid,
        slug: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let normalized = normalize_key(slug);

        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, slug, owner_id, last_updated_by, last_activity_at,
                   created_at, updated_at
            FROM projects
            WHERE owner_id = $1 AND slug = $2
            "#,
        )
        .bind(owner_id)
        .bind(normalized)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists the IDs of every project the user owns or is a member of
    ///
    /// Duplicates (owner who is also a member) collapse via UNION.
    pub async fn accessible_ids(pool: &PgPool, user_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let ids: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM projects WHERE owner_id = $1
            UNION
            SELECT project_id FROM project_members WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    /// Loads a set of projects by ID, ordered by name
    pub async fn list_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, slug, owner_id, last_updated_by, last_activity_at,
                   created_at, updated_at
            FROM projects
            WHERE id = ANY($1)
            ORDER BY name ASC
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Deletes a project
    ///
    /// Members, invites, releases, transaction events, and activity
    /// entries cascade.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_project_struct() {
        let create = CreateProject {
            owner_id: Uuid::new_v4(),
            name: "Acme Corp".to_string(),
            slug: normalize_key("Acme Corp"),
        };

        assert_eq!(create.slug, "acme-corp");
    }

    // Access-scoped queries are covered by the integration tests in tests/.
}
