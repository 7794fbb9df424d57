use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Extension,
};

use crate::alert::AlertKind;
use crate::database::keys;
use crate::error::AppError;
use crate::handlers::render;
use crate::middleware::RequestContext;
use crate::server::AppState;
use crate::templates;

/// GET/POST /settings - site-wide configuration
pub async fn settings(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Response, AppError> {
    let mut site_title = state.config.get(keys::SITE_TITLE).await;

    if let Some(form) = &ctx.form {
        site_title = form.get("site_title").trim().to_string();
        match save_settings(&state, &site_title).await {
            Ok(()) => {
                tracing::info!("Site title changed to '{}'", site_title);
                ctx.session.add_alert(AlertKind::Info, "settings saved")?;
                return Ok(Redirect::to("/settings").into_response());
            }
            Err(e) => ctx.session.add_alert(AlertKind::Danger, e.alert_message())?,
        }
    }

    render(&state, &ctx, "Settings", templates::settings_form(&site_title)).await
}

async fn save_settings(state: &AppState, site_title: &str) -> Result<(), AppError> {
    if site_title.is_empty() {
        return Err(AppError::invalid("site title is required"));
    }

    let config = state.config.clone();
    let site_title = site_title.to_string();
    state
        .db
        .transaction(move |t| {
            Box::pin(async move {
                config.set(t, keys::SITE_TITLE, &site_title).await?;
                Ok::<_, AppError>(())
            })
        })
        .await
}
