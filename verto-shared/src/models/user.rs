/// User model and database operations
///
/// Users own projects and hold memberships on projects shared with
/// them. Passwords are stored as Argon2id hashes, never in plaintext.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email CITEXT NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     display_name VARCHAR(120),
///     avatar_url TEXT,
///     job_title VARCHAR(120),
///     location VARCHAR(120),
///     bio TEXT,
///     phone_number VARCHAR(40),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use verto_shared::models::user::{CreateUser, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     email: "jane@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     display_name: None,
/// }).await?;
///
/// assert_eq!(user.display_name.as_deref(), Some("jane"));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User model representing an account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Email address (case-insensitive via CITEXT, unique)
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Display name shown in activity feeds and invite emails
    pub display_name: Option<String>,

    /// Avatar/profile picture URL
    pub avatar_url: Option<String>,

    /// Job title
    pub job_title: Option<String>,

    /// Location
    pub location: Option<String>,

    /// Free-form biography
    pub bio: Option<String>,

    /// Phone number
    pub phone_number: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address (stored case-insensitively)
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,

    /// Optional display name; defaults to the email local part
    pub display_name: Option<String>,
}

/// Input for a partial profile update
///
/// Outer `Option` = "was the field sent"; inner `Option` = the new
/// value, where `None` clears the column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfile {
    pub display_name: Option<Option<String>>,
    pub avatar_url: Option<Option<String>>,
    pub job_title: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub bio: Option<Option<String>>,
    pub phone_number: Option<Option<String>>,
}

impl User {
    /// Creates a new user
    ///
    /// When no display name is given it defaults to the local part of
    /// the email address ("jane" for "jane@example.com").
    ///
    /// # Errors
    ///
    /// Returns an error if the email already exists (unique constraint
    /// violation) or the database is unavailable.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let display_name = data.display_name.or_else(|| {
            data.email
                .split_once('@')
                .map(|(local, _)| local.to_string())
                .or_else(|| Some(data.email.clone()))
        });

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, display_name)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, display_name, avatar_url, job_title,
                      location, bio, phone_number, created_at, updated_at
            "#,
        )
        .bind(data.email)
        .bind(data.password_hash)
        .bind(display_name)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, display_name, avatar_url, job_title,
                   location, bio, phone_number, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address (case-insensitive via CITEXT)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, display_name, avatar_url, job_title,
                   location, bio, phone_number, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Applies a partial profile update
    ///
    /// Only fields present in `data` are touched; `Some(None)` clears a
    /// column. `updated_at` is always bumped.
    ///
    /// # Returns
    ///
    /// The updated user, or None if the user doesn't exist.
    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProfile,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build the UPDATE dynamically from the fields that were sent.
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        let fields: [(&str, &Option<Option<String>>); 6] = [
            ("display_name", &data.display_name),
            ("avatar_url", &data.avatar_url),
            ("job_title", &data.job_title),
            ("location", &data.location),
            ("bio", &data.bio),
            ("phone_number", &data.phone_number),
        ];

        for (column, value) in &fields {
            if value.is_some() {
                bind_count += 1;
                query.push_str(&format!(", {} = ${}", column, bind_count));
            }
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, email, password_hash, display_name, avatar_url, \
             job_title, location, bio, phone_number, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        for (_, value) in fields {
            if let Some(new_value) = value.clone() {
                q = q.bind(new_value);
            }
        }

        let user = q.fetch_optional(pool).await?;

        Ok(user)
    }

    /// Replaces the stored password hash
    ///
    /// Callers verify the current password first; see
    /// [`crate::auth::password::verify_password`].
    pub async fn set_password_hash(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a user by ID
    ///
    /// Owned projects cascade; activity entries keep a NULL user.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
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
    fn test_create_user_struct() {
        let create = CreateUser {
            email: "test@example.com".to_string(),
            password_hash: "hash".to_string(),
            display_name: None,
        };

        assert_eq!(create.email, "test@example.com");
        assert!(create.display_name.is_none());
    }

    #[test]
    fn test_update_profile_default_is_empty() {
        let update = UpdateProfile::default();
        assert!(update.display_name.is_none());
        assert!(update.avatar_url.is_none());
        assert!(update.job_title.is_none());
        assert!(update.location.is_none());
        assert!(update.bio.is_none());
        assert!(update.phone_number.is_none());
    }

    // Database operations are covered by the integration tests in tests/.
}
