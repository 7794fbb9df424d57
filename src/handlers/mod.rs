// Page handlers, grouped by the tier the access gate enforces for them:
// public (anyone), protected (signed-in accounts), elevated (admins).
pub mod elevated;
pub mod protected;
pub mod public;

use axum::{
    middleware,
    response::{Html, IntoResponse, Response},
    Router,
};

use crate::database::keys;
use crate::error::AppError;
use crate::middleware::{access_gate, GateState, RequestContext, Tier};
use crate::server::AppState;
use crate::templates;

/// Render `content` inside the page layout, consuming pending alerts
pub async fn render(
    state: &AppState,
    ctx: &RequestContext,
    title: &str,
    content: String,
) -> Result<Response, AppError> {
    let alerts = ctx.session.drain_alerts()?;
    let mut site_title = state.config.get(keys::SITE_TITLE).await;
    if site_title.is_empty() {
        site_title = keys::DEFAULT_SITE_TITLE.to_string();
    }

    Ok(Html(templates::page(&site_title, title, ctx.user.as_ref(), &alerts, &content)).into_response())
}

/// Put every route of `router` behind the access gate at `tier`
fn gated(router: Router<AppState>, state: &AppState, tier: Tier) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(
        GateState {
            app: state.clone(),
            tier,
        },
        access_gate,
    ))
}

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(gated(public::routes(), state, Tier::Public))
        .merge(gated(protected::routes(), state, Tier::Registered))
        .merge(gated(elevated::routes(), state, Tier::Admin))
}
