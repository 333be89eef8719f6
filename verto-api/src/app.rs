/// Application state and router builder
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                        # Liveness + DB ping (public)
/// └── /v1/
///     ├── /auth/                     # Public
///     │   ├── POST /signup
///     │   ├── POST /login
///     │   ├── POST /refresh
///     │   ├── GET  /invites/:token   # Invite preview (token is the credential)
///     │   └── POST /accept-invite
///     ├── /users/                    # Authenticated
///     │   ├── GET   /me
///     │   ├── PATCH /me
///     │   └── PUT   /me/password
///     ├── /projects/                 # Authenticated
///     │   ├── GET  /activity
///     │   ├── GET  /:client/activity
///     │   └── POST /:client/invites
///     ├── /releases/                 # Authenticated
///     │   ├── GET    /
///     │   ├── PUT    /
///     │   └── DELETE /:client/:env
///     ├── /transaction-events/       # Authenticated
///     │   ├── GET  /
///     │   ├── POST /
///     │   └── PUT  /:id
///     └── /organizations/            # Authenticated
///         ├── GET  /
///         └── POST /
/// ```
///
/// Middleware, bottom to top: request tracing, CORS, then per-group
/// JWT authentication.

use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use verto_shared::auth::jwt;
use verto_shared::auth::middleware::AuthUser;
use verto_shared::email::Mailer;
use verto_shared::invites::InviteSettings;

/// Shared application state
///
/// Cloned per request via Axum's `State` extractor; Arc keeps the
/// clone cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Outbound mailer
    pub mailer: Mailer,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, mailer: Mailer, config: Config) -> Self {
        Self {
            db,
            mailer,
            config: Arc::new(config),
        }
    }

    /// JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Invitation settings derived from configuration
    pub fn invite_settings(&self) -> InviteSettings {
        self.config.invite_settings()
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Public: signup/login plus the invite acceptance surface, which
    // authenticates by token rather than session.
    let auth_routes = Router::new()
        .route("/signup", post(routes::auth::signup))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route("/invites/:token", get(routes::auth::preview_invite))
        .route("/accept-invite", post(routes::auth::accept_invite));

    let user_routes = Router::new()
        .route("/me", get(routes::users::get_profile))
        .route("/me", patch(routes::users::update_profile))
        .route("/me/password", put(routes::users::update_password));

    let project_routes = Router::new()
        .route("/activity", get(routes::projects::activity_summaries))
        .route("/:client/activity", get(routes::projects::project_activity))
        .route("/:client/invites", post(routes::projects::create_invite));

    let release_routes = Router::new()
        .route("/", get(routes::releases::list_releases))
        .route("/", put(routes::releases::upsert_release))
        .route("/:client/:env", delete(routes::releases::delete_release));

    let transaction_event_routes = Router::new()
        .route("/", get(routes::transaction_events::list_events))
        .route("/", post(routes::transaction_events::create_event))
        .route("/:id", put(routes::transaction_events::update_event));

    let organization_routes = Router::new()
        .route("/", get(routes::organizations::list_organizations))
        .route("/", post(routes::organizations::create_organization));

    let authenticated = Router::new()
        .nest("/users", user_routes)
        .nest("/projects", project_routes)
        .nest("/releases", release_routes)
        .nest("/transaction-events", transaction_event_routes)
        .nest("/organizations", organization_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new().nest("/auth", auth_routes).merge(authenticated);

    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Validates the Bearer token and injects [`AuthUser`] into request
/// extensions for the handlers behind it.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        crate::error::ApiError::BadRequest("Expected Bearer token".to_string())
    })?;

    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    let auth_user = AuthUser::from_claims(claims.sub, claims.email);
    req.extensions_mut().insert(auth_user);

    Ok(next.run(req).await)
}
