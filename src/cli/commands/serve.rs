use anyhow::Context;
use clap::Args;
use tokio::net::TcpListener;

use crate::cli::commands::open_database;
use crate::config::AppConfig;
use crate::server::{self, AppState};

#[derive(Args, Default)]
pub struct ServeArgs {
    #[arg(long, env = "HTTP_HOST", help = "Address to listen on")]
    pub host: Option<String>,

    #[arg(long, env = "HTTP_PORT", help = "Port to listen on")]
    pub port: Option<u16>,
}

pub async fn handle(args: ServeArgs, mut settings: AppConfig) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        settings.http.host = host;
    }
    if let Some(port) = args.port {
        settings.http.port = port;
    }

    let db = open_database(&settings).await?;
    let addr = settings.bind_address().context("invalid listen address")?;
    let state = AppState::new(db, settings)
        .await
        .context("failed to load configuration")?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Informas listening on http://{}", addr);

    server::serve(listener, state).await.context("server error")
}
