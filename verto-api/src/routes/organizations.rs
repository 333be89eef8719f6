/// Organization endpoints
///
/// Organizations are the project list presented as {id, name, code}
/// summaries — the shape the legacy dashboard selector consumes.
///
/// # Endpoints
///
/// - `GET /v1/organizations` - accessible organizations, name ASC
/// - `POST /v1/organizations` - create one from an explicit name + code

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use verto_shared::access;
use verto_shared::auth::middleware::AuthUser;
use verto_shared::models::project::Project;

/// Organization summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationSummary {
    pub id: Uuid,
    pub name: String,
    pub code: String,
}

impl OrganizationSummary {
    fn from_project(project: &Project) -> Self {
        Self {
            id: project.id,
            name: project.name.clone(),
            code: project.slug.clone(),
        }
    }
}

/// Organization creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrganizationRequest {
    #[validate(length(min = 1, message = "Organization name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Organization code is required"))]
    pub code: String,
}

/// Lists organizations accessible to the caller, name ascending
pub async fn list_organizations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<Vec<OrganizationSummary>>> {
    let project_ids = access::accessible_project_ids(&state.db, auth.user_id).await?;

    let projects = Project::list_by_ids(&state.db, &project_ids).await?;
    let summaries = projects.iter().map(OrganizationSummary::from_project).collect();

    Ok(Json(summaries))
}

/// Creates an organization
///
/// # Errors
///
/// - `400 Bad Request`: name or code is blank after normalization
/// - `409 Conflict`: the code already resolves for this caller
pub async fn create_organization(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreateOrganizationRequest>,
) -> ApiResult<Json<OrganizationSummary>> {
    req.validate().map_err(crate::routes::validation_details)?;

    let project =
        access::create_project_with_code(&state.db, auth.user_id, &req.name, &req.code).await?;

    Ok(Json(OrganizationSummary::from_project(&project)))
}
