// Pages anyone may reach, signed in or not
pub mod install;
pub mod login;
pub mod logout;

use axum::{routing::get, Router};

use crate::server::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/install", get(install::install).post(install::install))
        .route("/login", get(login::login).post(login::login))
        .route("/logout", get(logout::logout).post(logout::logout))
}
