/// Transaction event endpoints
///
/// # Endpoints
///
/// - `GET /v1/transaction-events` - events grouped by client
/// - `POST /v1/transaction-events` - create an event
/// - `PUT /v1/transaction-events/:id` - update an event
///
/// Event codes are globally unique by their normalized key, across all
/// projects — integrations reference codes without a client qualifier.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;
use verto_shared::access;
use verto_shared::activity;
use verto_shared::auth::middleware::AuthUser;
use verto_shared::keys::normalize_key;
use verto_shared::models::activity::ActivityAction;
use verto_shared::models::project::Project;
use verto_shared::models::transaction_event::TransactionEvent;

/// Transaction event as rendered to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionEventPayload {
    pub id: Uuid,
    pub client: String,
    pub project_id: Uuid,
    pub project_name: String,
    pub code: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Events grouped by client slug
pub type TransactionEventsResponse = HashMap<String, Vec<TransactionEventPayload>>;

/// Event creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTransactionEventRequest {
    /// Client (project) slug the event belongs to
    #[validate(length(min = 1, message = "Client is required"))]
    pub client: String,

    /// Display code
    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,

    /// Description
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
}

/// Event update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTransactionEventRequest {
    #[validate(length(min = 1, message = "Client is required"))]
    pub client: String,

    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
}

/// Lists all transaction events visible to the caller
pub async fn list_events(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<TransactionEventsResponse>> {
    let map = build_events_map(&state, auth.user_id).await?;

    Ok(Json(map))
}

/// Creates a transaction event
///
/// # Errors
///
/// - `400 Bad Request`: code normalizes to empty
/// - `404 Not Found`: client slug doesn't resolve for the caller
/// - `409 Conflict`: normalized code already exists anywhere
pub async fn create_event(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreateTransactionEventRequest>,
) -> ApiResult<Json<TransactionEventsResponse>> {
    req.validate().map_err(crate::routes::validation_details)?;

    let code_key = normalize_key(&req.code);
    if code_key.is_empty() {
        return Err(ApiError::BadRequest("Code is required".to_string()));
    }

    // Friendly pre-check; a racing insert still lands on the unique
    // constraint and maps to the same Conflict.
    if TransactionEvent::find_by_code_key(&state.db, &code_key)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(
            "Transaction event already exists".to_string(),
        ));
    }

    let project = Project::find_accessible_by_slug(&state.db, auth.user_id, &req.client)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let event = TransactionEvent::create(
        &state.db,
        project.id,
        req.code.trim(),
        &code_key,
        req.description.trim(),
    )
    .await?;

    activity::record_activity(
        &state.db,
        project.id,
        Some(auth.user_id),
        ActivityAction::TransactionEventCreated,
        Some(json!({ "transaction_id": event.id, "code": event.code })),
    )
    .await?;

    let map = build_events_map(&state, auth.user_id).await?;
    Ok(Json(map))
}

/// Updates a transaction event
///
/// Changing the code re-checks global uniqueness; changing the client
/// re-resolves the target project under the caller's access scope.
///
/// # Errors
///
/// - `404 Not Found`: unknown event, or unknown target client
/// - `403 Forbidden`: caller has no access to the event's project
/// - `409 Conflict`: the new code collides with another event
pub async fn update_event(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTransactionEventRequest>,
) -> ApiResult<Json<TransactionEventsResponse>> {
    req.validate().map_err(crate::routes::validation_details)?;

    let event = TransactionEvent::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Transaction event not found".to_string()))?;

    let can_edit = access::is_user_in_project(&state.db, event.project_id, auth.user_id).await?;
    if !can_edit {
        return Err(ApiError::Forbidden(
            "You do not have access to this transaction event".to_string(),
        ));
    }

    let code_key = normalize_key(&req.code);
    if code_key.is_empty() {
        return Err(ApiError::BadRequest("Code is required".to_string()));
    }

    if code_key != event.code_key {
        if let Some(conflict) = TransactionEvent::find_by_code_key(&state.db, &code_key).await? {
            if conflict.id != event.id {
                return Err(ApiError::Conflict(
                    "Transaction event already exists".to_string(),
                ));
            }
        }
    }

    let current_project = Project::find_by_id(&state.db, event.project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let target_project = if normalize_key(&req.client) != current_project.slug {
        Project::find_accessible_by_slug(&state.db, auth.user_id, &req.client)
            .await?
            .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?
    } else {
        current_project
    };

    let updated = TransactionEvent::update(
        &state.db,
        event.id,
        target_project.id,
        req.code.trim(),
        &code_key,
        req.description.trim(),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Transaction event not found".to_string()))?;

    activity::record_activity(
        &state.db,
        updated.project_id,
        Some(auth.user_id),
        ActivityAction::TransactionEventUpdated,
        Some(json!({ "transaction_id": updated.id, "code": updated.code })),
    )
    .await?;

    let map = build_events_map(&state, auth.user_id).await?;
    Ok(Json(map))
}

/// Builds the client → events map for one user
async fn build_events_map(
    state: &AppState,
    user_id: Uuid,
) -> ApiResult<TransactionEventsResponse> {
    let project_ids = access::accessible_project_ids(&state.db, user_id).await?;
    if project_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let projects = Project::list_by_ids(&state.db, &project_ids).await?;
    let by_id: HashMap<Uuid, &Project> = projects.iter().map(|p| (p.id, p)).collect();

    let events = TransactionEvent::list_for_projects(&state.db, &project_ids).await?;

    let mut map: TransactionEventsResponse = HashMap::new();
    for event in events {
        let Some(project) = by_id.get(&event.project_id) else {
            continue;
        };

        map.entry(project.slug.clone())
            .or_default()
            .push(TransactionEventPayload {
                id: event.id,
                client: project.slug.clone(),
                project_id: event.project_id,
                project_name: project.name.clone(),
                code: event.code,
                description: event.description,
                created_at: event.created_at,
                updated_at: event.updated_at,
            });
    }

    Ok(map)
}
