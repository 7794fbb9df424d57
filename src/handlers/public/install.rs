use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Extension,
};

use crate::alert::AlertKind;
use crate::database::models::user::User;
use crate::database::{keys, ConfigCache};
use crate::error::AppError;
use crate::handlers::render;
use crate::middleware::{FormData, RequestContext};
use crate::server::AppState;
use crate::templates;

/// GET/POST /install - one-time setup of the first admin and site config
pub async fn install(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Response, AppError> {
    if state.config.get_int(keys::INSTALLED).await != 0 {
        return Ok(Redirect::to("/").into_response());
    }

    let form = ctx.form();
    if ctx.form.is_some() {
        match complete_install(&state, &form).await {
            Ok(admin) => {
                tracing::info!("Installation complete; admin '{}' (ID: {})", admin.username, admin.id);
                ctx.session.add_alert(AlertKind::Info, "installation complete")?;
                return Ok(Redirect::to("/login").into_response());
            }
            Err(e) => ctx.session.add_alert(AlertKind::Danger, e.alert_message())?,
        }
    }

    let site_title = match form.get("site_title") {
        "" => keys::DEFAULT_SITE_TITLE,
        title => title,
    };
    let content = templates::install_form(form.get("admin_username"), form.get("admin_email"), site_title);
    render(&state, &ctx, "Install", content).await
}

/// Create the admin and mark the site installed, all or nothing
async fn complete_install(state: &AppState, form: &FormData) -> Result<User, AppError> {
    let username = form.get("admin_username").trim();
    let password = form.get("admin_password");
    let email = form.get("admin_email").trim();
    if username.is_empty() || password.is_empty() || email.is_empty() {
        return Err(AppError::invalid("all fields are required"));
    }

    let site_title = match form.get("site_title").trim() {
        "" => keys::DEFAULT_SITE_TITLE.to_string(),
        title => title.to_string(),
    };

    let mut admin = User {
        username: username.to_string(),
        email: email.to_string(),
        is_admin: true,
        ..User::default()
    };
    admin.set_password(password)?;

    let config = state.config.clone();
    state
        .db
        .transaction(move |t| {
            Box::pin(async move {
                // Another request may have finished installing first
                let installed = ConfigCache::stored(t, keys::INSTALLED).await?;
                if installed.and_then(|v| v.parse::<i64>().ok()).unwrap_or(0) != 0 {
                    return Err(AppError::invalid("already installed"));
                }

                admin.save(t).await?;
                config.set_int(t, keys::INSTALLED, 1).await?;
                config.set(t, keys::SITE_TITLE, &site_title).await?;
                Ok::<_, AppError>(admin)
            })
        })
        .await
}
