use axum::{
    response::{IntoResponse, Redirect, Response},
    Extension,
};

use crate::alert::AlertKind;
use crate::error::AppError;
use crate::middleware::RequestContext;

/// GET/POST /logout
pub async fn logout(Extension(ctx): Extension<RequestContext>) -> Result<Response, AppError> {
    if let Some(user) = &ctx.user {
        tracing::info!("User '{}' (ID: {}) logged out", user.username, user.id);
    }
    ctx.session.clear_user_id()?;
    ctx.session.add_alert(AlertKind::Info, "you have been logged out")?;
    Ok(Redirect::to("/login").into_response())
}
