pub mod createuser;
pub mod migrate;
pub mod serve;

use anyhow::Context;

use crate::config::AppConfig;
use crate::database::Database;

/// Connect and bring the schema up to date
pub(crate) async fn open_database(settings: &AppConfig) -> anyhow::Result<Database> {
    let db = Database::connect(&settings.database.url, settings.database.max_connections)
        .await
        .with_context(|| format!("failed to open database {}", settings.database.url))?;
    db.migrate().await.context("failed to apply migrations")?;
    Ok(db)
}
