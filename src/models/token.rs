use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Type tag of tokens issued by the forgot-password flow.
pub const FORGOT_PASSWORD: &str = "forgotpassword";

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Token {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing)]
    pub token_hash: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub created_at: DateTime<Utc>,
}

impl Token {
    /// A token stays redeemable while `now - created_at <= ttl`.
    pub fn is_expired_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at > ttl
    }
}
