use crate::cli::commands::open_database;
use crate::config::AppConfig;

pub async fn handle(settings: AppConfig) -> anyhow::Result<()> {
    let db = open_database(&settings).await?;
    db.close().await;
    println!("Migrations applied to {}", settings.database.url);
    Ok(())
}
