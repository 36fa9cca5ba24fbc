use crate::db;
use crate::email::PasswordResetMail;
use crate::models::token::FORGOT_PASSWORD;
use crate::state::AppState;

use super::{generate_token, hash_token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueOutcome {
    /// A token was stored and handed to the mailer.
    Issued,
    UnknownEmail,
    Throttled,
}

/// Issue a reset token for `email` and mail it to the owner.
///
/// The outcome is for logging only. HTTP callers run this off the request
/// path so neither the outcome nor its latency reaches the response.
pub async fn request_reset(state: &AppState, email: &str) -> Result<IssueOutcome, sqlx::Error> {
    let email = email.trim();

    let Some(user) = db::users::find_by_email(&state.pool, email).await? else {
        tracing::info!("Forgot-password request for unknown email");
        return Ok(IssueOutcome::UnknownEmail);
    };

    // Only known accounts get a throttle entry.
    if let Err(retry_after) = state.forgot_limiter.check(&user.email) {
        tracing::warn!(
            "Forgot-password requests throttled for user {}, retry in {retry_after}s",
            user.id
        );
        return Ok(IssueOutcome::Throttled);
    }

    let token = generate_token();
    let stored = db::tokens::create(&state.pool, user.id, &hash_token(&token), FORGOT_PASSWORD).await?;

    let mail = PasswordResetMail {
        to: user.email.clone(),
        reset_url: format!(
            "{}/reset?token={token}",
            state.config.base_url.trim_end_matches('/')
        ),
        token,
        valid_for_hours: state.config.token_ttl_hours,
    };

    if let Err(e) = state.mailer.send_password_reset(&mail).await {
        tracing::error!("Failed to send password reset email for token {}: {e}", stored.id);
    } else {
        tracing::info!("Password reset token {} issued for user {}", stored.id, user.id);
    }

    Ok(IssueOutcome::Issued)
}
