/// Invitation lifecycle
///
/// State machine per (project, invited email):
///
/// ```text
/// none ──create_invite──▶ pending ──consume_invite──▶ consumed (row deleted)
///              ▲              │
///              └──────────────┘  create_invite again re-issues:
///                                new token, new expiry, marker cleared
/// ```
///
/// Tokens are 32 random bytes hex-encoded (256 bits of entropy) and
/// leave the system only inside the invite email — API responses carry
/// an acknowledgement, never the token. Consumption deletes the row,
/// so a replayed token fails NotFound rather than "already used".
///
/// Every validation failure has its own [`InviteError`] variant; the
/// API layer maps each to a stable status so the client can render
/// distinct messages ("expired" vs "already used" vs "not found").

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::email::{EmailError, Mailer, ProjectInviteEmail};
use crate::keys::normalize_key;
use crate::models::invite::ProjectInvite;
use crate::models::membership::{ProjectMember, ProjectRole};
use crate::models::project::Project;
use crate::models::user::User;

/// Default invite lifetime when not configured
pub const DEFAULT_INVITE_TTL_HOURS: i64 = 72;

/// Number of random bytes in an invite token (hex doubles the length)
const TOKEN_BYTES: usize = 32;

/// Error type for the invitation lifecycle
#[derive(Debug, thiserror::Error)]
pub enum InviteError {
    /// No project with that slug is owned by the inviter
    #[error("Project not found")]
    ProjectNotFound,

    /// Inviting account no longer exists
    #[error("Inviter not found")]
    InviterNotFound,

    /// Invited address normalized to an empty string
    #[error("Email is required")]
    EmailRequired,

    /// Owner tried to invite their own address
    #[error("You cannot invite yourself")]
    SelfInvite,

    /// Invitee already has access to the project
    #[error("User already has access to this project")]
    AlreadyMember,

    /// No invite matches the token
    #[error("Invite not found")]
    NotFound,

    /// Invite carries an acceptance marker
    #[error("Invite already used")]
    AlreadyUsed,

    /// Invite expiry lies in the past
    #[error("Invite expired")]
    Expired,

    /// Invite email could not be delivered
    #[error(transparent)]
    Email(#[from] EmailError),

    /// Underlying database error
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Invitation behavior configuration
#[derive(Debug, Clone)]
pub struct InviteSettings {
    /// Hours until a freshly issued token expires
    pub ttl_hours: i64,

    /// Base URL of the web client, used to build acceptance links
    pub client_url: String,

    /// When true, a failed invite email is logged instead of failing
    /// the request. Default is to propagate — the inviter should know
    /// the invite never left.
    pub email_best_effort: bool,
}

impl Default for InviteSettings {
    fn default() -> Self {
        Self {
            ttl_hours: DEFAULT_INVITE_TTL_HOURS,
            client_url: "http://localhost:5173".to_string(),
            email_best_effort: false,
        }
    }
}

/// Invite details rendered on the acceptance screen
///
/// Served to unauthenticated callers holding the token, so it carries
/// display data only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteDetails {
    /// Invited email address
    pub email: String,

    /// Project display name
    pub project_name: String,

    /// Project slug (the "client" key)
    pub client: String,

    /// Email of the inviter; empty if the account is gone
    pub inviter_email: String,

    /// Token expiry
    pub expires_at: DateTime<Utc>,
}

/// Generates a fresh invitation token
///
/// 32 bytes from the thread RNG (OsRng-seeded CSPRNG), hex-encoded to
/// 64 characters.
pub fn generate_invite_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Builds the acceptance URL the invite email points at
///
/// Tokens are hex, so no percent-encoding is needed.
pub fn build_invite_url(client_url: &str, token: &str) -> String {
    format!("{}/?inviteToken={}", client_url.trim_end_matches('/'), token)
}

/// Creates (or re-issues) an invite and emails the acceptance link
///
/// Only the project owner may invite. Re-inviting an address that
/// already has a pending invite replaces its token and expiry — the
/// old link dies immediately.
///
/// # Errors
///
/// - `ProjectNotFound`: the slug isn't a project owned by `owner_id`
/// - `EmailRequired`: the address normalized to an empty string
/// - `SelfInvite`: the owner invited their own address
/// - `AlreadyMember`: the invitee already has access
/// - `Email`: delivery failed and `email_best_effort` is off
pub async fn create_invite(
    pool: &PgPool,
    mailer: &Mailer,
    settings: &InviteSettings,
    owner_id: Uuid,
    project_slug: &str,
    raw_email: &str,
) -> Result<(), InviteError> {
    let project = Project::find_owned_by_slug(pool, owner_id, project_slug)
        .await?
        .ok_or(InviteError::ProjectNotFound)?;

    let email = normalize_key(raw_email);
    if email.is_empty() {
        return Err(InviteError::EmailRequired);
    }

    let inviter = User::find_by_id(pool, owner_id)
        .await?
        .ok_or(InviteError::InviterNotFound)?;

    if normalize_key(&inviter.email) == email {
        return Err(InviteError::SelfInvite);
    }

    if let Some(invitee) = User::find_by_email(pool, &email).await? {
        let already_member = project.owner_id == invitee.id
            || ProjectMember::exists(pool, project.id, invitee.id).await?;
        if already_member {
            return Err(InviteError::AlreadyMember);
        }
    }

    let token = generate_invite_token();
    let expires_at = Utc::now() + Duration::hours(settings.ttl_hours);

    let invite =
        ProjectInvite::upsert(pool, project.id, owner_id, &email, &token, expires_at).await?;

    info!(
        project_id = %project.id,
        invite_id = %invite.id,
        "invite issued"
    );

    let template = ProjectInviteEmail {
        invite_link: build_invite_url(&settings.client_url, &token),
        project_name: project.name.clone(),
        inviter_email: inviter.email.clone(),
    };

    match mailer.send_project_invite(&email, &template).await {
        Ok(()) => Ok(()),
        Err(e) if settings.email_best_effort => {
            warn!(invite_id = %invite.id, error = %e, "invite email failed, continuing");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Looks up an active invite and returns its display details
///
/// Validity checks are the same as consumption: unknown token is
/// NotFound, an acceptance marker is AlreadyUsed, a past expiry is
/// Expired.
pub async fn get_invite_details(pool: &PgPool, token: &str) -> Result<InviteDetails, InviteError> {
    let invite = find_active_invite(pool, token).await?;

    let project = Project::find_by_id(pool, invite.project_id)
        .await?
        .ok_or(InviteError::ProjectNotFound)?;

    let inviter_email = User::find_by_id(pool, invite.invited_by)
        .await?
        .map(|u| u.email)
        .unwrap_or_default();

    Ok(InviteDetails {
        email: invite.email,
        project_name: project.name,
        client: project.slug,
        inviter_email,
        expires_at: invite.expires_at,
    })
}

/// Consumes an invite: grants editor membership and burns the token
///
/// Single-use is enforced by deletion — once consumed, the token no
/// longer resolves and a second call fails NotFound.
pub async fn consume_invite(
    pool: &PgPool,
    token: &str,
    user_id: Uuid,
) -> Result<ProjectInvite, InviteError> {
    let invite = find_active_invite(pool, token).await?;

    ProjectMember::ensure(pool, invite.project_id, user_id, ProjectRole::Editor).await?;
    ProjectInvite::delete(pool, invite.id).await?;

    info!(
        project_id = %invite.project_id,
        user_id = %user_id,
        "invite consumed"
    );

    Ok(invite)
}

/// Resolves a token to a pending, unexpired invite
async fn find_active_invite(pool: &PgPool, token: &str) -> Result<ProjectInvite, InviteError> {
    let invite = ProjectInvite::find_by_token(pool, token.trim())
        .await?
        .ok_or(InviteError::NotFound)?;

    if invite.accepted_at.is_some() {
        return Err(InviteError::AlreadyUsed);
    }

    if invite.is_expired(Utc::now()) {
        return Err(InviteError::Expired);
    }

    Ok(invite)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_format() {
        let token = generate_invite_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = generate_invite_token();
        let b = generate_invite_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_build_invite_url() {
        assert_eq!(
            build_invite_url("http://localhost:5173", "abc"),
            "http://localhost:5173/?inviteToken=abc"
        );
        assert_eq!(
            build_invite_url("https://app.verto.dev/", "abc"),
            "https://app.verto.dev/?inviteToken=abc"
        );
    }

    #[test]
    fn test_default_settings() {
        let settings = InviteSettings::default();
        assert_eq!(settings.ttl_hours, 72);
        assert!(!settings.email_best_effort);
    }

    // The full lifecycle (issue → preview → consume → replay fails)
    // is covered by the integration tests in tests/.
}
