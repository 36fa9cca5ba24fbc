use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::AppError;
use crate::reset::issuer;
use crate::reset::redeemer::{self, Redemption};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
}

pub async fn forgot(
    State(state): State<SharedState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> StatusCode {
    // Always 204, returned before lookup and mail, so neither status nor
    // timing reveals whether the email exists
    tokio::spawn(async move {
        if let Err(e) = issuer::request_reset(&state, &req.email).await {
            tracing::error!("Forgot-password request failed: {e}");
        }
    });

    StatusCode::NO_CONTENT
}

pub async fn reset(
    State(state): State<SharedState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<StatusCode, AppError> {
    let user_id = redeemer::redeem(
        &state.pool,
        state.config.token_ttl(),
        Redemption {
            token: &req.token,
            password: &req.password,
            password_confirmation: &req.password_confirmation,
        },
    )
    .await
    .inspect_err(|e| tracing::warn!("Password reset rejected: {e}"))?;

    tracing::info!("Password reset for user {user_id}");

    Ok(StatusCode::NO_CONTENT)
}
