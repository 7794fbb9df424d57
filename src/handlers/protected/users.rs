use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension,
};

use crate::alert::AlertKind;
use crate::auth::password;
use crate::database::models::user::{User, UserLookup};
use crate::database::DatabaseError;
use crate::error::AppError;
use crate::handlers::render;
use crate::middleware::{FormData, RequestContext};
use crate::server::AppState;
use crate::templates;

/// Validated account fields from a create/edit form
pub(crate) struct UserForm {
    pub username: String,
    pub email: String,
    /// Encoded verifier when a new password was entered
    pub password: Option<String>,
    /// `(is_admin, is_disabled)`, only honored for admins
    pub flags: Option<(bool, bool)>,
}

impl UserForm {
    pub(crate) fn parse(form: &FormData, with_flags: bool) -> Result<Self, AppError> {
        let username = form.get("username").trim();
        if username.is_empty() {
            return Err(AppError::invalid("username is required"));
        }

        let password = match form.get("password") {
            "" => None,
            plaintext if plaintext != form.get("password2") => {
                return Err(AppError::invalid("passwords do not match"));
            }
            plaintext => Some(password::hash_password(plaintext)?),
        };

        Ok(Self {
            username: username.to_string(),
            email: form.get("email").trim().to_string(),
            password,
            flags: with_flags.then(|| (form.checked("is_admin"), form.checked("is_disabled"))),
        })
    }

    pub(crate) fn apply(&self, user: &mut User) {
        user.username = self.username.clone();
        user.email = self.email.clone();
        if let Some(password) = &self.password {
            user.password = password.clone();
        }
        if let Some((is_admin, is_disabled)) = self.flags {
            user.is_admin = is_admin;
            user.is_disabled = is_disabled;
        }
    }
}

/// Show submitted values again after a failed save
pub(crate) fn prefill(user: &mut User, form: &FormData, with_flags: bool) {
    user.username = form.get("username").to_string();
    user.email = form.get("email").to_string();
    if with_flags {
        user.is_admin = form.checked("is_admin");
        user.is_disabled = form.checked("is_disabled");
    }
}

pub(crate) fn save_error(err: DatabaseError) -> AppError {
    if err.is_unique_violation() {
        AppError::invalid("username is already taken")
    } else {
        err.into()
    }
}

/// GET/POST /users/:id/edit - own profile, or any account for admins
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Response, AppError> {
    let Some(current) = ctx.user.clone() else {
        return Ok(Redirect::to("/login").into_response());
    };
    if !current.is_admin && current.id != id {
        return Ok(StatusCode::NOT_FOUND.into_response());
    }

    let Some(mut user) = User::find(&mut state.db.token(), UserLookup::Id(id)).await? else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };

    if let Some(form) = &ctx.form {
        match update_user(&state, &current, id, form).await {
            Ok(saved) => {
                tracing::info!("User '{}' (ID: {}) saved by '{}'", saved.username, saved.id, current.username);
                ctx.session.add_alert(AlertKind::Info, "user account saved")?;
                let next = if current.is_admin { "/users" } else { "/" };
                return Ok(Redirect::to(next).into_response());
            }
            Err(e) => {
                ctx.session.add_alert(AlertKind::Danger, e.alert_message())?;
                prefill(&mut user, form, current.is_admin);
            }
        }
    }

    let content = templates::user_form(&format!("/users/{}/edit", id), &user, current.is_admin);
    render(&state, &ctx, "Edit User", content).await
}

async fn update_user(state: &AppState, current: &User, id: i64, form: &FormData) -> Result<User, AppError> {
    let changes = UserForm::parse(form, current.is_admin)?;

    if current.id == id {
        if let Some((is_admin, is_disabled)) = changes.flags {
            if !is_admin {
                return Err(AppError::invalid("you cannot remove your own admin access"));
            }
            if is_disabled {
                return Err(AppError::invalid("you cannot disable your own account"));
            }
        }
    }

    state
        .db
        .transaction(move |t| {
            Box::pin(async move {
                let Some(mut user) = User::find(t, UserLookup::Id(id)).await? else {
                    return Err(AppError::invalid("invalid user"));
                };
                changes.apply(&mut user);
                user.save(t).await.map_err(save_error)?;
                Ok::<_, AppError>(user)
            })
        })
        .await
}
