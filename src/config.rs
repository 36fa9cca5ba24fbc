use std::net::IpAddr;

use chrono::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub token_ttl_hours: i64,
    pub forgot_limit: u32,
    pub forgot_window_secs: u64,
    pub max_body_size: usize,
    pub log_level: String,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;

        let host: IpAddr = env_or("PWRESET_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid PWRESET_HOST: {e}"))?;

        let port: u16 = env_or("PWRESET_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid PWRESET_PORT: {e}"))?;

        let base_url = env_or("PWRESET_BASE_URL", &format!("http://{host}:{port}"));

        let token_ttl_hours: i64 = env_or("PWRESET_TOKEN_TTL_HOURS", "2")
            .parse()
            .map_err(|e| format!("Invalid PWRESET_TOKEN_TTL_HOURS: {e}"))?;
        if token_ttl_hours <= 0 {
            return Err("PWRESET_TOKEN_TTL_HOURS must be positive".to_string());
        }

        let forgot_limit: u32 = env_or("PWRESET_FORGOT_LIMIT", "5")
            .parse()
            .map_err(|e| format!("Invalid PWRESET_FORGOT_LIMIT: {e}"))?;

        let forgot_window_secs: u64 = env_or("PWRESET_FORGOT_WINDOW_SECS", "900")
            .parse()
            .map_err(|e| format!("Invalid PWRESET_FORGOT_WINDOW_SECS: {e}"))?;

        let max_body_size: usize = env_or("PWRESET_MAX_BODY_SIZE", "16384")
            .parse()
            .map_err(|e| format!("Invalid PWRESET_MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("PWRESET_LOG_LEVEL", "info");

        let smtp = match (
            std::env::var("PWRESET_SMTP_HOST").ok(),
            std::env::var("PWRESET_SMTP_PORT").ok(),
            std::env::var("PWRESET_SMTP_USER").ok(),
            std::env::var("PWRESET_SMTP_PASS").ok(),
            std::env::var("PWRESET_SMTP_FROM").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid PWRESET_SMTP_PORT: {e}"))?,
                user,
                pass,
                from,
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            host,
            port,
            base_url,
            token_ttl_hours,
            forgot_limit,
            forgot_window_secs,
            max_body_size,
            log_level,
            smtp,
        })
    }

    /// How long a freshly issued reset token stays redeemable.
    pub fn token_ttl(&self) -> Duration {
        Duration::hours(self.token_ttl_hours)
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
