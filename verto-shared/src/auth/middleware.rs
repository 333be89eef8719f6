/// Authentication middleware for Axum
///
/// Validates the `Authorization: Bearer <token>` header and injects an
/// [`AuthUser`] into request extensions. Handlers extract it with
/// Axum's `Extension` extractor:
///
/// ```
/// use axum::Extension;
/// use verto_shared::auth::middleware::AuthUser;
///
/// async fn handler(Extension(auth): Extension<AuthUser>) -> String {
///     format!("user {} ({})", auth.user_id, auth.email)
/// }
/// ```
///
/// The middleware trusts validated claims unconditionally — it is the
/// identity provider for everything downstream. Project-level access
/// is a separate question answered per request by [`crate::access`].

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_access_token, JwtError};

/// Authenticated caller identity added to request extensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Email the session was issued for
    pub email: String,
}

impl AuthUser {
    /// Builds the identity from validated JWT claims
    pub fn from_claims(user_id: Uuid, email: String) -> Self {
        Self { user_id, email }
    }
}

/// Error type for authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Invalid authorization header format
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
        }
    }
}

/// JWT authentication middleware
///
/// # Errors
///
/// - 401 if the header is missing, the token is invalid, or expired
/// - 400 if the header isn't a Bearer token
pub async fn jwt_auth_middleware(
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = validate_access_token(token, &secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    let auth_user = AuthUser::from_claims(claims.sub, claims.email);
    req.extensions_mut().insert(auth_user);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_user_from_claims() {
        let user_id = Uuid::new_v4();
        let auth = AuthUser::from_claims(user_id, "a@co.com".to_string());

        assert_eq!(auth.user_id, user_id);
        assert_eq!(auth.email, "a@co.com");
    }

    #[test]
    fn test_auth_error_into_response() {
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::InvalidFormat("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AuthError::InvalidToken("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
