use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password;
use crate::db;
use crate::models::token::FORGOT_PASSWORD;

use super::{hash_token, ResetError};

pub struct Redemption<'a> {
    pub token: &'a str,
    pub password: &'a str,
    pub password_confirmation: &'a str,
}

/// Consume a reset token and replace the owner's password.
///
/// Runs in one transaction with the token row locked, so a token can be
/// redeemed at most once. Returns the id of the user whose password changed.
pub async fn redeem(
    pool: &PgPool,
    ttl: Duration,
    req: Redemption<'_>,
) -> Result<Uuid, ResetError> {
    let mut tx = pool.begin().await?;

    let token = db::tokens::find_by_hash_for_update(&mut *tx, &hash_token(req.token))
        .await?
        .ok_or(ResetError::NotFound)?;

    if token.token_type != FORGOT_PASSWORD {
        return Err(ResetError::Invalid);
    }

    if token.is_expired_at(Utc::now(), ttl) {
        return Err(ResetError::Expired);
    }

    password::validate_new(req.password, req.password_confirmation)
        .map_err(ResetError::Validation)?;

    let pw_hash = password::hash(req.password).map_err(ResetError::Internal)?;
    db::users::update_password(&mut *tx, token.user_id, &pw_hash).await?;

    // Also drops sibling reset tokens issued for the same user.
    db::tokens::delete_for_user_by_type(&mut *tx, token.user_id, FORGOT_PASSWORD).await?;

    tx.commit().await?;

    Ok(token.user_id)
}
