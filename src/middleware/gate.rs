use std::collections::HashMap;

use axum::{
    body::Body,
    extract::{FromRequest, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use tower_cookies::Cookies;

use crate::alert::AlertKind;
use crate::auth::Session;
use crate::database::keys;
use crate::database::models::user::User;
use crate::error::AppError;
use crate::middleware::identity::resolve_user;
use crate::server::AppState;

/// Who may reach a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Anyone, signed in or not
    Public,
    /// Any enabled account
    Registered,
    /// Accounts with the admin flag
    Admin,
}

impl Tier {
    pub fn permits(self, user: Option<&User>) -> bool {
        match self {
            Tier::Public => true,
            Tier::Registered => user.is_some(),
            Tier::Admin => user.is_some_and(|u| u.is_admin),
        }
    }
}

/// Middleware state for one group of routes sharing a tier
#[derive(Clone)]
pub struct GateState {
    pub app: AppState,
    pub tier: Tier,
}

/// Parsed `application/x-www-form-urlencoded` body
#[derive(Debug, Clone, Default)]
pub struct FormData(HashMap<String, String>);

impl FormData {
    /// Field value, empty when the field was not submitted
    pub fn get(&self, key: &str) -> &str {
        self.0.get(key).map(String::as_str).unwrap_or("")
    }

    /// Checkbox semantics: any non-empty value counts as checked
    pub fn checked(&self, key: &str) -> bool {
        !self.get(key).is_empty()
    }
}

impl From<HashMap<String, String>> for FormData {
    fn from(values: HashMap<String, String>) -> Self {
        Self(values)
    }
}

/// Everything a page handler learns from the gate
#[derive(Clone)]
pub struct RequestContext {
    pub user: Option<User>,
    pub session: Session,
    /// Present for every non-safe method
    pub form: Option<FormData>,
}

impl RequestContext {
    pub fn form(&self) -> FormData {
        self.form.clone().unwrap_or_default()
    }
}

/// Outcome of the access checks for one request
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Run the handler. `drop_claim` asks for the session's user claim to be
    /// cleared because it names an account that may no longer sign in.
    Dispatch { user: Option<User>, drop_claim: bool },
    /// Installation has not been completed
    Install,
    /// The page's tier is not satisfied. `drop_claim` as for `Dispatch`.
    Unauthorized { drop_claim: bool },
}

/// Installation check, identity resolution and tier enforcement, in that order
pub async fn evaluate(state: &AppState, tier: Tier, path: &str, claimed: Option<i64>) -> Decision {
    if state.config.get_int(keys::INSTALLED).await == 0 && path != "/install" {
        tracing::debug!("Not installed; redirecting {} to /install", path);
        return Decision::Install;
    }

    let mut user = resolve_user(&state.db, claimed).await;
    let mut drop_claim = false;

    if let Some(u) = &user {
        if u.is_disabled {
            tracing::warn!("Ignoring session for disabled user '{}' (ID: {})", u.username, u.id);
            user = None;
            drop_claim = true;
        }
    }

    if !tier.permits(user.as_ref()) {
        tracing::warn!("Access to {} denied for {:?} tier", path, tier);
        return Decision::Unauthorized { drop_claim };
    }

    tracing::debug!(
        "Dispatching {} as {}",
        path,
        user.as_ref().map_or("anonymous", |u| u.username.as_str())
    );
    Decision::Dispatch { user, drop_claim }
}

/// Axum middleware wrapping every page route
pub async fn access_gate(
    State(gate): State<GateState>,
    cookies: Cookies,
    mut request: Request,
    next: Next,
) -> Response {
    let session = Session::new(cookies, gate.app.session_keys.clone());
    let path = request.uri().path().to_string();

    match evaluate(&gate.app, gate.tier, &path, session.user_id()).await {
        Decision::Install => Redirect::to("/install").into_response(),
        Decision::Unauthorized { drop_claim } => {
            if drop_claim {
                if let Err(e) = session.clear_user_id() {
                    return AppError::from(e).into_response();
                }
            }
            if let Err(e) = session.add_alert(AlertKind::Danger, "page requires authorization") {
                return AppError::from(e).into_response();
            }
            Redirect::to("/login").into_response()
        }
        Decision::Dispatch { user, drop_claim } => {
            if drop_claim {
                if let Err(e) = session.clear_user_id() {
                    return AppError::from(e).into_response();
                }
            }

            let form = if request.method().is_safe() {
                None
            } else {
                match read_form(&mut request, gate.app.settings.http.max_form_bytes).await {
                    Ok(form) => Some(form),
                    Err(status) => {
                        tracing::warn!("Rejected {} {}: {}", request.method(), path, status);
                        return status.into_response();
                    }
                }
            };

            request.extensions_mut().insert(RequestContext { user, session, form });
            next.run(request).await
        }
    }
}

/// Read and parse the form body, then put the bytes back for the handler
async fn read_form(request: &mut Request, limit: usize) -> Result<FormData, StatusCode> {
    let body = std::mem::take(request.body_mut());
    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE)?;

    let mut probe = axum::http::Request::builder()
        .method(request.method().clone())
        .uri(request.uri().clone());
    if let Some(content_type) = request.headers().get(CONTENT_TYPE) {
        probe = probe.header(CONTENT_TYPE, content_type.clone());
    }
    let probe = probe
        .body(Body::from(bytes.clone()))
        .map_err(|_| StatusCode::BAD_REQUEST)?;

    let Form(values) = Form::<HashMap<String, String>>::from_request(probe, &())
        .await
        .map_err(|rejection| rejection.status())?;

    *request.body_mut() = Body::from(bytes);
    Ok(FormData(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::Database;

    async fn state() -> AppState {
        let db = Database::in_memory().await.unwrap();
        AppState::new(db, AppConfig::development()).await.unwrap()
    }

    async fn install(state: &AppState) {
        state
            .config
            .set_int(&mut state.db.token(), keys::INSTALLED, 1)
            .await
            .unwrap();
    }

    async fn add_user(state: &AppState, name: &str, is_admin: bool, is_disabled: bool) -> User {
        let mut user = User {
            username: name.to_string(),
            is_admin,
            is_disabled,
            ..User::default()
        };
        user.save(&mut state.db.token()).await.unwrap();
        user
    }

    #[test]
    fn tiers_are_ordered_by_privilege() {
        let member = User::default();
        let admin = User {
            is_admin: true,
            ..User::default()
        };

        assert!(Tier::Public.permits(None));
        assert!(!Tier::Registered.permits(None));
        assert!(Tier::Registered.permits(Some(&member)));
        assert!(!Tier::Admin.permits(Some(&member)));
        assert!(Tier::Admin.permits(Some(&admin)));
    }

    #[test]
    fn form_fields_default_to_empty() {
        let form = FormData::from(HashMap::from([
            ("username".to_string(), "alice".to_string()),
            ("is_admin".to_string(), "on".to_string()),
        ]));
        assert_eq!(form.get("username"), "alice");
        assert_eq!(form.get("email"), "");
        assert!(form.checked("is_admin"));
        assert!(!form.checked("is_disabled"));
    }

    #[tokio::test]
    async fn uninstalled_redirects_everything_but_install() {
        let state = state().await;
        let admin = add_user(&state, "root", true, false).await;

        for tier in [Tier::Public, Tier::Registered, Tier::Admin] {
            assert_eq!(evaluate(&state, tier, "/", Some(admin.id)).await, Decision::Install);
        }
        assert_eq!(
            evaluate(&state, Tier::Public, "/install", None).await,
            Decision::Dispatch {
                user: None,
                drop_claim: false
            }
        );
    }

    #[tokio::test]
    async fn admin_pages_reject_regular_users() {
        let state = state().await;
        install(&state).await;
        let bob = add_user(&state, "bob", false, false).await;

        assert_eq!(
            evaluate(&state, Tier::Admin, "/users", Some(bob.id)).await,
            Decision::Unauthorized { drop_claim: false }
        );
        assert_eq!(
            evaluate(&state, Tier::Registered, "/", Some(bob.id)).await,
            Decision::Dispatch {
                user: Some(bob),
                drop_claim: false
            }
        );
    }

    #[tokio::test]
    async fn stale_claims_resolve_to_anonymous() {
        let state = state().await;
        install(&state).await;
        let bob = add_user(&state, "bob", false, false).await;
        bob.delete(&mut state.db.token()).await.unwrap();

        assert_eq!(
            evaluate(&state, Tier::Public, "/login", Some(bob.id)).await,
            Decision::Dispatch {
                user: None,
                drop_claim: false
            }
        );
        assert_eq!(
            evaluate(&state, Tier::Registered, "/", Some(bob.id)).await,
            Decision::Unauthorized { drop_claim: false }
        );
    }

    #[tokio::test]
    async fn disabled_users_are_signed_out() {
        let state = state().await;
        install(&state).await;
        let eve = add_user(&state, "eve", true, true).await;

        assert_eq!(
            evaluate(&state, Tier::Public, "/login", Some(eve.id)).await,
            Decision::Dispatch {
                user: None,
                drop_claim: true
            }
        );
        assert_eq!(
            evaluate(&state, Tier::Admin, "/users", Some(eve.id)).await,
            Decision::Unauthorized { drop_claim: true }
        );
        assert_eq!(
            evaluate(&state, Tier::Registered, "/", Some(eve.id)).await,
            Decision::Unauthorized { drop_claim: true }
        );
    }

    #[tokio::test]
    async fn admin_pages_reject_anonymous_visitors() {
        let state = state().await;
        install(&state).await;

        for path in ["/users", "/users/new", "/settings"] {
            assert_eq!(
                evaluate(&state, Tier::Admin, path, None).await,
                Decision::Unauthorized { drop_claim: false }
            );
        }
    }
}
