/// Release tracking endpoints
///
/// # Endpoints
///
/// - `GET /v1/releases` - all releases visible to the caller, grouped
///   client → environment
/// - `PUT /v1/releases` - upsert one (client, environment) release
/// - `DELETE /v1/releases/:client/:env` - remove a release
///
/// Upserting into an unknown client creates the project on the fly
/// (the caller becomes owner) — the dashboard's "just type a new
/// client name" flow. Mutations append activity entries and notify
/// collaborators best-effort.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;
use verto_shared::access;
use verto_shared::activity;
use verto_shared::auth::middleware::AuthUser;
use verto_shared::email::ReleaseUpdateEmail;
use verto_shared::keys::normalize_key;
use verto_shared::models::activity::ActivityAction;
use verto_shared::models::project::Project;
use verto_shared::models::release::{Release, UpsertRelease};

/// Release data for one environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleasePayload {
    pub branch: String,
    pub version: String,
    pub build: i32,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
}

/// Releases grouped client → environment → payload
pub type ReleasesResponse = HashMap<String, HashMap<String, ReleasePayload>>;

/// Release upsert request
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertReleaseRequest {
    /// Client (project) display name or slug
    #[validate(length(min = 1, message = "Client is required"))]
    pub client: String,

    /// Target environment
    #[validate(length(min = 1, message = "Environment is required"))]
    pub environment: String,

    #[validate(length(min = 1, message = "Branch is required"))]
    pub branch: String,

    #[validate(length(min = 1, message = "Version is required"))]
    pub version: String,

    pub build: i32,

    pub date: NaiveDate,

    pub commit_message: Option<String>,
}

/// Lists all releases visible to the caller
pub async fn list_releases(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<ReleasesResponse>> {
    let map = build_releases_map(&state, auth.user_id).await?;

    Ok(Json(map))
}

/// Creates or overwrites the release for (client, environment)
///
/// Side effects: a `release_upserted` activity entry and a
/// fire-and-forget notification to the project's other collaborators.
///
/// # Errors
///
/// - `400 Bad Request`: client or environment normalizes to empty
/// - `422 Unprocessable Entity`: validation failed
pub async fn upsert_release(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<UpsertReleaseRequest>,
) -> ApiResult<Json<ReleasesResponse>> {
    req.validate().map_err(crate::routes::validation_details)?;

    let environment = normalize_key(&req.environment);
    if environment.is_empty() {
        return Err(ApiError::BadRequest("Environment is required".to_string()));
    }

    // Get-or-create keeps the "type a new client name" flow one call.
    let project = access::ensure_project_for_user(&state.db, auth.user_id, &req.client).await?;

    let release = Release::upsert(
        &state.db,
        project.id,
        &project.slug,
        &environment,
        UpsertRelease {
            branch: req.branch,
            version: req.version,
            build: req.build,
            date: req.date,
            commit_message: req.commit_message,
        },
    )
    .await?;

    activity::record_activity(
        &state.db,
        project.id,
        Some(auth.user_id),
        ActivityAction::ReleaseUpserted,
        Some(json!({
            "environment": release.environment,
            "version": release.version,
            "build": release.build,
        })),
    )
    .await?;

    notify_collaborators(&state, &project, auth.user_id, &release).await;

    let map = build_releases_map(&state, auth.user_id).await?;
    Ok(Json(map))
}

/// Deletes the release for (client, environment)
///
/// # Errors
///
/// - `403 Forbidden`: caller has no access to the project
/// - `404 Not Found`: no release for that environment
pub async fn delete_release(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((client, env)): Path<(String, String)>,
) -> ApiResult<Json<ReleasesResponse>> {
    let environment = normalize_key(&env);

    let project = Project::find_accessible_by_slug(&state.db, auth.user_id, &client)
        .await?
        .ok_or_else(|| {
            ApiError::Forbidden("You do not have access to this project".to_string())
        })?;

    let release = Release::find_by_project_and_env(&state.db, project.id, &environment)
        .await?
        .ok_or_else(|| ApiError::NotFound("Release not found".to_string()))?;

    Release::delete(&state.db, release.id).await?;

    activity::record_activity(
        &state.db,
        project.id,
        Some(auth.user_id),
        ActivityAction::ReleaseDeleted,
        Some(json!({ "environment": release.environment })),
    )
    .await?;

    let map = build_releases_map(&state, auth.user_id).await?;
    Ok(Json(map))
}

/// Builds the grouped client → environment → payload map
async fn build_releases_map(state: &AppState, user_id: Uuid) -> ApiResult<ReleasesResponse> {
    let project_ids = access::accessible_project_ids(&state.db, user_id).await?;
    if project_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let releases = Release::list_for_projects(&state.db, &project_ids).await?;

    let mut map: ReleasesResponse = HashMap::new();
    for release in releases {
        map.entry(release.client_key.clone()).or_default().insert(
            release.environment.clone(),
            ReleasePayload {
                branch: release.branch,
                version: release.version,
                build: release.build,
                date: release.date,
                commit_message: release.commit_message,
            },
        );
    }

    Ok(map)
}

/// Emails the project's other collaborators about a release
///
/// Best-effort by design: the release is already committed, and a
/// notification outage must not fail the upsert. Failures are logged.
async fn notify_collaborators(
    state: &AppState,
    project: &Project,
    actor_id: Uuid,
    release: &Release,
) {
    let collaborators = match access::project_collaborators(&state.db, project.id).await {
        Ok(collaborators) => collaborators,
        Err(e) => {
            warn!(project_id = %project.id, error = %e, "failed to resolve notification fan-out");
            return;
        }
    };

    let actor_email = collaborators
        .iter()
        .find(|u| u.id == actor_id)
        .map(|u| u.email.clone())
        .unwrap_or_default();

    let template = ReleaseUpdateEmail {
        project_name: project.name.clone(),
        environment: release.environment.clone(),
        version: release.version.clone(),
        updated_by: actor_email,
    };

    let mailer = state.mailer.clone();
    let recipients: Vec<String> = collaborators
        .into_iter()
        .filter(|u| u.id != actor_id)
        .map(|u| u.email)
        .collect();

    tokio::spawn(async move {
        for recipient in recipients {
            if let Err(e) = mailer.send_release_update(&recipient, &template).await {
                warn!(recipient, error = %e, "release notification failed");
            }
        }
    });
}
