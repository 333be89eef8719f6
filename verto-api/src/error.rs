/// Error handling for the API server
///
/// One unified error type that maps to HTTP responses. Handlers return
/// `Result<T, ApiError>`; `From` impls translate every domain error
/// from the shared crate, so `?` is the whole error-handling story at
/// the route level.
///
/// The sqlx translation carries the concurrency model: a lost insert
/// race on any unique constraint surfaces as 409 Conflict, never as a
/// 500 or a silent duplicate.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use verto_shared::access::AccessError;
use verto_shared::activity::ActivityError;
use verto_shared::auth::jwt::JwtError;
use verto_shared::auth::password::PasswordError;
use verto_shared::email::EmailError;
use verto_shared::invites::InviteError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - e.g. duplicate email, duplicate code
    Conflict(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable error code (e.g. "not_found", "conflict")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
///
/// Unique-constraint violations become Conflict with a message keyed
/// off the constraint name; everything else is internal.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    return ApiError::Conflict(conflict_message(constraint));
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

fn conflict_message(constraint: &str) -> String {
    if constraint.contains("users_email") {
        "Email already in use".to_string()
    } else if constraint.contains("transaction_events_code_key") {
        "Transaction event already exists".to_string()
    } else if constraint.contains("projects_owner_id_slug") {
        "An organization with this code already exists.".to_string()
    } else if constraint.contains("project_invites") {
        "An invite for this address already exists".to_string()
    } else {
        format!("Constraint violation: {}", constraint)
    }
}

/// Convert auth middleware errors to API errors
impl From<verto_shared::auth::middleware::AuthError> for ApiError {
    fn from(err: verto_shared::auth::middleware::AuthError) -> Self {
        use verto_shared::auth::middleware::AuthError;

        match err {
            AuthError::MissingCredentials => {
                ApiError::Unauthorized("Missing credentials".to_string())
            }
            AuthError::InvalidFormat(msg) => ApiError::BadRequest(msg),
            AuthError::InvalidToken(msg) => ApiError::Unauthorized(msg),
        }
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer { .. } => {
                ApiError::Unauthorized("Invalid token issuer".to_string())
            }
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert access-layer errors to API errors
impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::ProjectNotFound => ApiError::NotFound("Project not found".to_string()),
            AccessError::InvalidName => {
                ApiError::BadRequest("A non-empty name is required".to_string())
            }
            AccessError::SlugTaken => {
                ApiError::Conflict("An organization with this code already exists.".to_string())
            }
            AccessError::Database(e) => e.into(),
        }
    }
}

/// Convert activity errors to API errors
impl From<ActivityError> for ApiError {
    fn from(err: ActivityError) -> Self {
        match err {
            ActivityError::ProjectNotFound => ApiError::NotFound("Project not found".to_string()),
            ActivityError::Database(e) => e.into(),
        }
    }
}

/// Convert invitation errors to API errors
///
/// Each lifecycle failure keeps its own status + message so the client
/// renders distinct screens for "expired", "already used", and "gone".
impl From<InviteError> for ApiError {
    fn from(err: InviteError) -> Self {
        match err {
            InviteError::ProjectNotFound => ApiError::NotFound("Project not found".to_string()),
            InviteError::InviterNotFound => ApiError::NotFound("Inviter not found".to_string()),
            InviteError::EmailRequired => ApiError::BadRequest("Email is required".to_string()),
            InviteError::SelfInvite => {
                ApiError::BadRequest("You cannot invite yourself".to_string())
            }
            InviteError::AlreadyMember => {
                ApiError::Conflict("User already has access to this project".to_string())
            }
            InviteError::NotFound => ApiError::NotFound("Invite not found".to_string()),
            InviteError::AlreadyUsed => ApiError::BadRequest("Invite already used".to_string()),
            InviteError::Expired => ApiError::BadRequest("Invite expired".to_string()),
            InviteError::Email(e) => {
                ApiError::InternalError(format!("Failed to send invite email: {}", e))
            }
            InviteError::Database(e) => e.into(),
        }
    }
}

/// Convert mailer errors to API errors
impl From<EmailError> for ApiError {
    fn from(err: EmailError) -> Self {
        ApiError::InternalError(format!("Email delivery failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Project not found".to_string());
        assert_eq!(err.to_string(), "Not found: Project not found");
    }

    #[test]
    fn test_invite_error_mapping_is_distinct() {
        // Single-use vs expired vs missing must map to distinguishable
        // responses.
        assert!(matches!(
            ApiError::from(InviteError::NotFound),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(InviteError::AlreadyUsed),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(InviteError::Expired),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(InviteError::AlreadyMember),
            ApiError::Conflict(_)
        ));
    }

    #[test]
    fn test_conflict_messages() {
        assert_eq!(conflict_message("users_email_key"), "Email already in use");
        assert_eq!(
            conflict_message("transaction_events_code_key_key"),
            "Transaction event already exists"
        );
        assert!(conflict_message("something_else").contains("something_else"));
    }

    #[test]
    fn test_validation_error_status() {
        let errors = vec![ValidationErrorDetail {
            field: "email".to_string(),
            message: "Invalid email format".to_string(),
        }];

        let response = ApiError::ValidationError(errors).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
