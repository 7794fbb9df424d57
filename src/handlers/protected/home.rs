use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Extension,
};

use crate::error::AppError;
use crate::handlers::render;
use crate::middleware::RequestContext;
use crate::server::AppState;
use crate::templates;

/// GET /
pub async fn home(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Response, AppError> {
    let Some(user) = &ctx.user else {
        return Ok(Redirect::to("/login").into_response());
    };
    let content = templates::home(user);
    render(&state, &ctx, "Home", content).await
}
