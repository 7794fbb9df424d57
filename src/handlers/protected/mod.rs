// Pages for any signed-in, enabled account
pub mod home;
pub mod users;

use axum::{routing::get, Router};

use crate::server::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/users/:id/edit", get(users::edit).post(users::edit))
}
