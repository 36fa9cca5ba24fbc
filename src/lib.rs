pub mod config;
pub mod error;
pub mod state;
pub mod auth;
pub mod db;
pub mod models;
pub mod routes;
pub mod email;
pub mod reset;
pub mod rate_limit;
pub mod worker;

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use sqlx::PgPool;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::email::Mailer;
use crate::rate_limit::ForgotPasswordLimiter;
use crate::state::{AppState, SharedState};

pub fn build_state(pool: PgPool, config: Config, mailer: Arc<dyn Mailer>) -> SharedState {
    let forgot_limiter =
        ForgotPasswordLimiter::new(config.forgot_limit, config.forgot_window_secs);

    Arc::new(AppState {
        pool,
        config,
        mailer,
        forgot_limiter,
    })
}

pub fn build_app(state: SharedState) -> Router {
    let max_body_size = state.config.max_body_size;

    Router::new()
        .merge(routes::api_routes())
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .with_state(state)
}
