/// User profile endpoints
///
/// - `GET /v1/users/me` - current profile
/// - `PATCH /v1/users/me` - partial profile update
/// - `PUT /v1/users/me/password` - change password

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use verto_shared::auth::middleware::AuthUser;
use verto_shared::auth::password;
use verto_shared::models::user::{UpdateProfile, User};

/// Public profile representation (never includes the password hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub job_title: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub phone_number: Option<String>,
}

impl UserProfile {
    /// Projects a user row onto its public profile
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            avatar_url: user.avatar_url.clone(),
            job_title: user.job_title.clone(),
            location: user.location.clone(),
            bio: user.bio.clone(),
            phone_number: user.phone_number.clone(),
        }
    }
}

/// Profile update request
///
/// Fields left out of the JSON body are untouched; fields sent as
/// blank strings clear the column.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 120, message = "Display name must be at most 120 characters"))]
    pub display_name: Option<String>,

    pub avatar_url: Option<String>,

    #[validate(length(max = 120, message = "Job title must be at most 120 characters"))]
    pub job_title: Option<String>,

    #[validate(length(max = 120, message = "Location must be at most 120 characters"))]
    pub location: Option<String>,

    pub bio: Option<String>,

    #[validate(length(max = 40, message = "Phone number must be at most 40 characters"))]
    pub phone_number: Option<String>,
}

/// Password change request
#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Returns the authenticated user's profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<UserProfile>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserProfile::from_user(&user)))
}

/// Applies a partial profile update
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UserProfile>> {
    req.validate()
        .map_err(crate::routes::validation_details)?;

    let update = UpdateProfile {
        display_name: req.display_name.map(normalize_optional),
        avatar_url: req.avatar_url.map(normalize_optional),
        job_title: req.job_title.map(normalize_optional),
        location: req.location.map(normalize_optional),
        bio: req.bio.map(normalize_optional),
        phone_number: req.phone_number.map(normalize_optional),
    };

    let user = User::update_profile(&state.db, auth.user_id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserProfile::from_user(&user)))
}

/// Changes the password after verifying the current one
///
/// # Errors
///
/// - `400 Bad Request`: current password is incorrect, or the new one
///   fails the strength policy
pub async fn update_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<UpdatePasswordRequest>,
) -> ApiResult<Json<UserProfile>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let matches = password::verify_password(&req.current_password, &user.password_hash)?;
    if !matches {
        return Err(ApiError::BadRequest(
            "Current password is incorrect".to_string(),
        ));
    }

    password::validate_password_strength(&req.new_password).map_err(ApiError::BadRequest)?;

    let new_hash = password::hash_password(&req.new_password)?;
    User::set_password_hash(&state.db, user.id, &new_hash).await?;

    Ok(Json(UserProfile::from_user(&user)))
}

/// Trims a submitted value; blank strings clear the column
fn normalize_optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_optional() {
        assert_eq!(normalize_optional("  Jane  ".to_string()), Some("Jane".to_string()));
        assert_eq!(normalize_optional("   ".to_string()), None);
        assert_eq!(normalize_optional(String::new()), None);
    }
}
