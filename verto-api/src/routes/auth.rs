/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/signup` - create an account
/// - `POST /v1/auth/login` - authenticate and get tokens
/// - `POST /v1/auth/refresh` - refresh an access token
/// - `GET /v1/auth/invites/:token` - preview a pending invite
/// - `POST /v1/auth/accept-invite` - join a project via invite token
///
/// The invite endpoints are public: the token itself is the
/// credential. Acceptance creates the account on the fly when the
/// invited address has none yet, then consumes the invite and issues a
/// session — one round trip from email link to working dashboard.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::users::UserProfile,
};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;
use verto_shared::auth::{jwt, password};
use verto_shared::invites::{self, InviteDetails};
use verto_shared::models::user::{CreateUser, User};

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (validated for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Optional display name
    #[validate(length(max = 120, message = "Display name must be at most 120 characters"))]
    pub display_name: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token
    pub access_token: String,
}

/// Invite acceptance request
#[derive(Debug, Deserialize)]
pub struct AcceptInviteRequest {
    /// Invite token from the email link
    pub token: String,

    /// Password for account creation; required only when the invited
    /// address has no account yet
    pub password: Option<String>,
}

/// Session response returned by signup, login, and invite acceptance
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,

    /// Authenticated profile
    pub user: UserProfile,
}

/// Registers a new account
///
/// # Errors
///
/// - `409 Conflict`: email already in use
/// - `422 Unprocessable Entity`: validation failed
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate().map_err(crate::routes::validation_details)?;

    password::validate_password_strength(&req.password).map_err(ApiError::BadRequest)?;

    let email = req.email.trim().to_lowercase();

    if User::find_by_email(&state.db, &email).await?.is_some() {
        return Err(ApiError::Conflict("Email already in use".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    // A racing signup for the same address loses on the unique
    // constraint and surfaces as the same Conflict.
    let user = User::create(
        &state.db,
        CreateUser {
            email,
            password_hash,
            display_name: req.display_name,
        },
    )
    .await?;

    build_auth_response(&state, &user).map(Json)
}

/// Authenticates a user
///
/// # Errors
///
/// - `401 Unauthorized`: unknown email or wrong password — the same
///   message for both, deliberately
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate().map_err(crate::routes::validation_details)?;

    let email = req.email.trim().to_lowercase();

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    build_auth_response(&state, &user).map(Json)
}

/// Exchanges a refresh token for a new access token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

/// Previews a pending invite for the acceptance screen
///
/// # Errors
///
/// - `404 Not Found`: unknown (or consumed) token
/// - `400 Bad Request`: invite already used or expired
pub async fn preview_invite(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<InviteDetails>> {
    let details = invites::get_invite_details(&state.db, &token).await?;

    Ok(Json(details))
}

/// Accepts an invite, creating the account if needed
///
/// Flow: validate the token, find or create the account for the
/// invited address, consume the invite (grants editor membership,
/// burns the token), and issue a session for the resulting account.
///
/// # Errors
///
/// - `400 Bad Request`: invite expired/used, or no password supplied
///   for a new account
/// - `404 Not Found`: unknown token
pub async fn accept_invite(
    State(state): State<AppState>,
    Json(req): Json<AcceptInviteRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let details = invites::get_invite_details(&state.db, &req.token).await?;

    let user = match User::find_by_email(&state.db, &details.email).await? {
        Some(existing) => existing,
        None => {
            let Some(raw_password) = req.password.as_deref() else {
                return Err(ApiError::BadRequest(
                    "Password is required to create your account".to_string(),
                ));
            };

            password::validate_password_strength(raw_password).map_err(ApiError::BadRequest)?;
            let password_hash = password::hash_password(raw_password)?;

            User::create(
                &state.db,
                CreateUser {
                    email: details.email.clone(),
                    password_hash,
                    display_name: None,
                },
            )
            .await?
        }
    };

    invites::consume_invite(&state.db, &req.token, user.id).await?;

    build_auth_response(&state, &user).map(Json)
}

fn build_auth_response(state: &AppState, user: &User) -> ApiResult<AuthResponse> {
    let access_claims = jwt::Claims::new(user.id, user.email.clone(), jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, user.email.clone(), jwt::TokenType::Refresh);

    Ok(AuthResponse {
        access_token: jwt::create_token(&access_claims, state.jwt_secret())?,
        refresh_token: jwt::create_token(&refresh_claims, state.jwt_secret())?,
        user: UserProfile::from_user(user),
    })
}
