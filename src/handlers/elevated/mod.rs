// Administrator-only pages
pub mod settings;
pub mod users;

use axum::{
    routing::{get, post},
    Router,
};

use crate::server::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list))
        .route("/users/new", get(users::create).post(users::create))
        .route("/users/:id/delete", post(users::delete))
        .route("/settings", get(settings::settings).post(settings::settings))
}
