/// Project activity and invitation endpoints
///
/// # Endpoints
///
/// - `GET /v1/projects/activity` - summaries for every accessible project
/// - `GET /v1/projects/:client/activity` - one project's feed
/// - `POST /v1/projects/:client/invites` - invite a collaborator (owner only)

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;
use verto_shared::activity::{self, ProjectActivitySummary};
use verto_shared::auth::middleware::AuthUser;
use verto_shared::invites;

/// Optional feed size override
#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    /// Number of entries per project
    pub log_limit: Option<i64>,
}

/// Invite creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInviteRequest {
    /// Address to invite
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Invite creation acknowledgement
///
/// Deliberately tokenless — the token only travels via email.
#[derive(Debug, Serialize)]
pub struct CreateInviteResponse {
    pub success: bool,
}

/// Activity summaries for every project accessible to the caller
///
/// Returns a map keyed by project slug; an empty map when the caller
/// has no projects.
pub async fn activity_summaries(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ActivityQuery>,
) -> ApiResult<Json<HashMap<String, ProjectActivitySummary>>> {
    let summaries =
        activity::activity_summaries(&state.db, auth.user_id, query.log_limit).await?;

    Ok(Json(summaries))
}

/// Activity feed for a single project
///
/// # Errors
///
/// - `404 Not Found`: the slug doesn't resolve for this caller
pub async fn project_activity(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(client): Path<String>,
    Query(query): Query<ActivityQuery>,
) -> ApiResult<Json<ProjectActivitySummary>> {
    let summary =
        activity::project_activity(&state.db, auth.user_id, &client, query.log_limit).await?;

    Ok(Json(summary))
}

/// Invites a collaborator to a project by email
///
/// Only the project owner may invite. Re-inviting a pending address
/// re-issues the token.
///
/// # Errors
///
/// - `404 Not Found`: caller doesn't own a project with this slug
/// - `400 Bad Request`: blank email or self-invite
/// - `409 Conflict`: invitee already has access
pub async fn create_invite(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(client): Path<String>,
    Json(req): Json<CreateInviteRequest>,
) -> ApiResult<Json<CreateInviteResponse>> {
    req.validate().map_err(crate::routes::validation_details)?;

    invites::create_invite(
        &state.db,
        &state.mailer,
        &state.invite_settings(),
        auth.user_id,
        &client,
        &req.email,
    )
    .await?;

    Ok(Json(CreateInviteResponse { success: true }))
}
