use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::email::Mailer;
use crate::rate_limit::ForgotPasswordLimiter;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub mailer: Arc<dyn Mailer>,
    pub forgot_limiter: ForgotPasswordLimiter,
}
