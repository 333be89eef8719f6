//! # Verto API Server
//!
//! Multi-tenant release tracking: projects, collaborator invites,
//! per-environment releases, transaction event codes, and an activity
//! feed — served as a JSON API over PostgreSQL.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p verto-api
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use verto_api::{
    app::{build_router, AppState},
    config::Config,
};
use verto_shared::db::{migrations, pool::create_pool, DatabaseConfig};
use verto_shared::email::Mailer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "verto_api=info,verto_shared=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Verto API Server v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    migrations::run_migrations(&pool).await?;

    let mailer = Mailer::new(config.mailer_config())?;

    let bind_address = config.bind_address();
    let state = AppState::new(pool, mailer, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
