/// Release model and database operations
///
/// One row per (project, environment): the currently deployed branch,
/// version, build number, and release date for that environment. Rows
/// are plain upsert targets; history lives in the activity log, not
/// here.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE releases (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     client_key VARCHAR(255) NOT NULL,
///     environment VARCHAR(255) NOT NULL,
///     branch VARCHAR(255) NOT NULL,
///     version VARCHAR(255) NOT NULL,
///     build INT NOT NULL,
///     date DATE NOT NULL,
///     commit_message TEXT,
///     UNIQUE (project_id, environment)
/// );
/// ```
///
/// `client_key` duplicates the project slug so the grouped listing
/// endpoint can build its client → environment map without a join.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Release row for one environment of a project
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Release {
    /// Unique release ID
    pub id: Uuid,

    /// Owning project
    pub project_id: Uuid,

    /// Normalized client key (the project slug at write time)
    pub client_key: String,

    /// Normalized environment key ("prod", "staging", ...)
    pub environment: String,

    /// Deployed branch name
    pub branch: String,

    /// Deployed version string
    pub version: String,

    /// Build number
    pub build: i32,

    /// Release date
    pub date: NaiveDate,

    /// Commit message attached to the release, if any
    pub commit_message: Option<String>,
}

/// Payload for creating or overwriting a release
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertRelease {
    pub branch: String,
    pub version: String,
    pub build: i32,
    pub date: NaiveDate,
    pub commit_message: Option<String>,
}

impl Release {
    /// Creates or overwrites the release for (project, environment)
    ///
    /// A concurrent insert for the same pair lands on the unique
    /// constraint and takes the UPDATE arm; last write wins.
    pub async fn upsert(
        pool: &PgPool,
        project_id: Uuid,
        client_key: &str,
        environment: &str,
        data: UpsertRelease,
    ) -> Result<Self, sqlx::Error> {
        let release = sqlx::query_as::<_, Release>(
            r#"
            INSERT INTO releases (project_id, client_key, environment, branch, version,
                                  build, date, commit_message)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (project_id, environment)
            DO UPDATE SET client_key = EXCLUDED.client_key,
                          branch = EXCLUDED.branch,
                          version = EXCLUDED.version,
                          build = EXCLUDED.build,
                          date = EXCLUDED.date,
                          commit_message = EXCLUDED.commit_message
            RETURNING id, project_id, client_key, environment, branch, version,
                      build, date, commit_message
            "#,
        )
        .bind(project_id)
        .bind(client_key)
        .bind(environment)
        .bind(data.branch)
        .bind(data.version)
        .bind(data.build)
        .bind(data.date)
        .bind(data.commit_message)
        .fetch_one(pool)
        .await?;

        Ok(release)
    }

    /// Finds the release for (project, environment)
    pub async fn find_by_project_and_env(
        pool: &PgPool,
        project_id: Uuid,
        environment: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let release = sqlx::query_as::<_, Release>(
            r#"
            SELECT id, project_id, client_key, environment, branch, version,
                   build, date, commit_message
            FROM releases
            WHERE project_id = $1 AND environment = $2
            "#,
        )
        .bind(project_id)
        .bind(environment)
        .fetch_optional(pool)
        .await?;

        Ok(release)
    }

    /// Lists releases across projects, ordered for the grouped view
    pub async fn list_for_projects(
        pool: &PgPool,
        project_ids: &[Uuid],
    ) -> Result<Vec<Self>, sqlx::Error> {
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }

        let releases = sqlx::query_as::<_, Release>(
            r#"
            SELECT id, project_id, client_key, environment, branch, version,
                   build, date, commit_message
            FROM releases
            WHERE project_id = ANY($1)
            ORDER BY client_key ASC, environment ASC
            "#,
        )
        .bind(project_ids)
        .fetch_all(pool)
        .await?;

        Ok(releases)
    }

    /// Deletes a release row
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM releases WHERE id = $1")
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
    fn test_upsert_release_payload() {
        let payload = UpsertRelease {
            branch: "main".to_string(),
            version: "1.4.2".to_string(),
            build: 128,
            date: NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            commit_message: Some("fix rollout gate".to_string()),
        };

        assert_eq!(payload.build, 128);
        assert_eq!(payload.date.to_string(), "2025-06-14");
    }
}
