use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Token;

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    token_hash: &str,
    token_type: &str,
) -> Result<Token, sqlx::Error> {
    // Stamped with the app clock, the same one expiry is checked against.
    sqlx::query_as::<_, Token>(
        "INSERT INTO tokens (user_id, token_hash, token_type, created_at)
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(user_id)
    .bind(token_hash)
    .bind(token_type)
    .bind(Utc::now())
    .fetch_one(executor)
    .await
}

/// Fetch a token and hold its row lock until the surrounding transaction ends.
pub async fn find_by_hash_for_update<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    token_hash: &str,
) -> Result<Option<Token>, sqlx::Error> {
    sqlx::query_as::<_, Token>("SELECT * FROM tokens WHERE token_hash = $1 FOR UPDATE")
        .bind(token_hash)
        .fetch_optional(executor)
        .await
}

pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Token>, sqlx::Error> {
    sqlx::query_as::<_, Token>(
        "SELECT * FROM tokens WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn delete_for_user_by_type<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    token_type: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tokens WHERE user_id = $1 AND token_type = $2")
        .bind(user_id)
        .bind(token_type)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_created_before(
    pool: &PgPool,
    token_type: &str,
    cutoff: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tokens WHERE token_type = $1 AND created_at < $2")
        .bind(token_type)
        .bind(cutoff)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
