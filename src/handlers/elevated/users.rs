use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Extension,
};

use crate::alert::AlertKind;
use crate::database::models::user::{User, UserLookup};
use crate::error::AppError;
use crate::handlers::protected::users::{prefill, save_error, UserForm};
use crate::handlers::render;
use crate::middleware::{FormData, RequestContext};
use crate::server::AppState;
use crate::templates;

/// GET /users
pub async fn list(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Response, AppError> {
    let users = User::all(&mut state.db.token()).await?;
    let current_id = ctx.user.as_ref().map_or(0, |u| u.id);
    render(&state, &ctx, "Users", templates::user_list(&users, current_id)).await
}

/// GET/POST /users/new
pub async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Response, AppError> {
    let mut user = User::default();

    if let Some(form) = &ctx.form {
        match create_user(&state, form).await {
            Ok(created) => {
                tracing::info!("Created user '{}' (ID: {})", created.username, created.id);
                ctx.session.add_alert(AlertKind::Info, "user account created")?;
                return Ok(Redirect::to("/users").into_response());
            }
            Err(e) => {
                ctx.session.add_alert(AlertKind::Danger, e.alert_message())?;
                prefill(&mut user, form, true);
            }
        }
    }

    render(&state, &ctx, "Create User", templates::user_form("/users/new", &user, true)).await
}

async fn create_user(state: &AppState, form: &FormData) -> Result<User, AppError> {
    let fields = UserForm::parse(form, true)?;
    if fields.password.is_none() {
        return Err(AppError::invalid("password is required"));
    }

    let mut user = User::default();
    fields.apply(&mut user);
    user.save(&mut state.db.token()).await.map_err(save_error)?;
    Ok(user)
}

/// POST /users/:id/delete
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Response, AppError> {
    match delete_user(&state, &ctx, id).await {
        Ok(user) => {
            tracing::info!("Deleted user '{}' (ID: {})", user.username, user.id);
            ctx.session.add_alert(AlertKind::Info, "user account deleted")?;
        }
        Err(e) => ctx.session.add_alert(AlertKind::Danger, e.alert_message())?,
    }
    Ok(Redirect::to("/users").into_response())
}

async fn delete_user(state: &AppState, ctx: &RequestContext, id: i64) -> Result<User, AppError> {
    if ctx.user.as_ref().is_some_and(|u| u.id == id) {
        return Err(AppError::invalid("you cannot delete your own account"));
    }

    let mut token = state.db.token();
    let Some(user) = User::find(&mut token, UserLookup::Id(id)).await? else {
        return Err(AppError::invalid("invalid user"));
    };
    if !user.delete(&mut token).await? {
        return Err(AppError::invalid("invalid user"));
    }
    Ok(user)
}
