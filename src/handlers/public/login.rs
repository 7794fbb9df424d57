use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Extension,
};

use crate::alert::AlertKind;
use crate::auth;
use crate::error::AppError;
use crate::handlers::render;
use crate::middleware::RequestContext;
use crate::server::AppState;
use crate::templates;

/// GET/POST /login
pub async fn login(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Response, AppError> {
    let form = ctx.form();
    let username = form.get("username");

    if ctx.form.is_some() {
        match auth::login(&state.db, username, form.get("password")).await {
            Ok(user) => {
                ctx.session.set_user_id(user.id)?;
                return Ok(Redirect::to("/").into_response());
            }
            Err(e) => ctx.session.add_alert(AlertKind::Danger, e.alert_message())?,
        }
    }

    render(&state, &ctx, "Login", templates::login_form(username)).await
}
