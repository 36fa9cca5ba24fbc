//! Password reset token lifecycle.
//!
//! A token is issued by [`issuer::request_reset`] and consumed by
//! [`redeemer::redeem`]. Only the SHA-256 digest of a token is stored; the raw
//! value exists in the outgoing email and nowhere else.

pub mod issuer;
pub mod redeemer;

use sha2::{Digest, Sha256};

#[derive(Debug)]
pub enum ResetError {
    /// No token matches the presented string.
    NotFound,
    /// The token exists but was issued for something other than a password reset.
    Invalid,
    /// The token is older than the validity window.
    Expired,
    /// New password and confirmation are unusable.
    Validation(String),
    Internal(String),
    Database(sqlx::Error),
}

impl std::fmt::Display for ResetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResetError::NotFound => write!(f, "reset token not found"),
            ResetError::Invalid => write!(f, "token is not a password reset token"),
            ResetError::Expired => write!(f, "reset token expired"),
            ResetError::Validation(msg) => write!(f, "validation failed: {msg}"),
            ResetError::Internal(msg) => write!(f, "internal error: {msg}"),
            ResetError::Database(err) => write!(f, "database error: {err}"),
        }
    }
}

impl From<sqlx::Error> for ResetError {
    fn from(err: sqlx::Error) -> Self {
        ResetError::Database(err)
    }
}

/// 32 random bytes, hex encoded.
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
