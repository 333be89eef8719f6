/// Database migration runner
///
/// Wraps sqlx's migration system. Migration files live in the
/// workspace-root `migrations/` directory; each consists of an up file
/// (`{timestamp}_{name}.up.sql`) and a down file
/// (`{timestamp}_{name}.down.sql`).
///
/// # Example
///
/// ```no_run
/// use verto_shared::db::pool::{create_pool, DatabaseConfig};
/// use verto_shared::db::migrations::run_migrations;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{debug, info, warn};

/// Runs all pending database migrations
///
/// Migrations already applied are skipped; a failing migration is
/// rolled back and returned as an error.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("running database migrations");

    let migrations = sqlx::migrate!("../migrations");

    match migrations.run(pool).await {
        Ok(()) => {
            info!("database migrations up to date");
            Ok(())
        }
        Err(e) => {
            warn!("migration failed: {}", e);
            Err(e)
        }
    }
}

/// Creates the database if it doesn't exist
///
/// Useful for development and test environments; production databases
/// are provisioned out of band.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if !Postgres::database_exists(database_url).await? {
        info!("database does not exist, creating it");
        Postgres::create_database(database_url).await?;
    } else {
        debug!("database already exists");
    }

    Ok(())
}

/// Drops the database
///
/// Permanently deletes all data. Test environments only.
pub async fn drop_database(database_url: &str) -> Result<(), sqlx::Error> {
    warn!("dropping database: {}", database_url);

    if Postgres::database_exists(database_url).await? {
        Postgres::drop_database(database_url).await?;
    }

    Ok(())
}
