pub mod password;

use axum::routing::{get, post};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .route("/forgot", post(password::forgot))
        .route("/reset", post(password::reset))
        .route("/health", get(health))
}

async fn health() -> &'static str {
    "ok"
}
