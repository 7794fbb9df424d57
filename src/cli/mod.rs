pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "informas")]
#[command(about = "Informas - multi-user web console")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, env = "DATABASE_URL", help = "SQLite database URL")]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the web console (default)")]
    Serve(commands::serve::ServeArgs),

    #[command(about = "Apply database migrations and exit")]
    Migrate,

    #[command(about = "Create a user account")]
    Createuser(commands::createuser::CreateUserArgs),
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut settings = AppConfig::from_env();
    if let Some(url) = cli.database_url {
        settings.database.url = url;
    }
    tracing::info!("Starting Informas in {:?} mode", settings.environment);

    match cli.command.unwrap_or_default() {
        Commands::Serve(args) => commands::serve::handle(args, settings).await,
        Commands::Migrate => commands::migrate::handle(settings).await,
        Commands::Createuser(args) => commands::createuser::handle(args, settings).await,
    }
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Serve(commands::serve::ServeArgs::default())
    }
}
