use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;

use crate::schemas::AppState;

/// Initialize application state for the given database URL, running any
/// pending migrations first.
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    tracing::info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    Migrator::up(&db, None).await?;

    Ok(AppState { db })
}
