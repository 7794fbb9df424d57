use anyhow::{bail, Context};
use clap::Args;

use crate::cli::commands::open_database;
use crate::config::AppConfig;
use crate::database::models::user::User;

#[derive(Args)]
pub struct CreateUserArgs {
    #[arg(long, help = "Username for the new account")]
    pub username: String,

    #[arg(long, help = "Password for the new account")]
    pub password: String,

    #[arg(long, default_value = "", help = "Email for the new account")]
    pub email: String,

    #[arg(long, help = "Create an admin account")]
    pub admin: bool,

    #[arg(long, help = "Create a disabled account")]
    pub disabled: bool,
}

pub async fn handle(args: CreateUserArgs, settings: AppConfig) -> anyhow::Result<()> {
    if args.username.trim().is_empty() || args.password.is_empty() {
        bail!("username and password must not be empty");
    }

    let db = open_database(&settings).await?;

    let mut user = User {
        username: args.username.trim().to_string(),
        email: args.email,
        is_admin: args.admin,
        is_disabled: args.disabled,
        ..User::default()
    };
    user.set_password(&args.password).context("failed to hash password")?;
    user.save(&mut db.token())
        .await
        .with_context(|| format!("failed to create user '{}'", user.username))?;

    tracing::info!("Created user '{}' (ID: {})", user.username, user.id);
    println!("user ID:{} created", user.id);

    db.close().await;
    Ok(())
}
