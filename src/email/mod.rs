pub mod templates;

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::{Config, SmtpConfig};

/// Everything a password reset notification needs to carry.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordResetMail {
    pub to: String,
    pub token: String,
    pub reset_url: String,
    pub valid_for_hours: i64,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_reset(&self, mail: &PasswordResetMail) -> Result<(), String>;
}

/// Pick the SMTP mailer when configured, otherwise fall back to logging.
pub fn from_config(config: &Config) -> Arc<dyn Mailer> {
    let Some(smtp) = config.smtp.as_ref() else {
        tracing::warn!("SMTP not configured, reset tokens will only be logged");
        return Arc::new(LogMailer);
    };

    match SmtpMailer::new(smtp) {
        Ok(mailer) => {
            tracing::info!("SMTP configured");
            Arc::new(mailer)
        }
        Err(e) => {
            tracing::warn!("SMTP not available: {e}");
            Arc::new(LogMailer)
        }
    }
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, String> {
        let creds = Credentials::new(config.user.clone(), config.pass.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("SMTP error: {e}"))?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            transport,
            from: config.from.clone(),
        })
    }

    async fn send(&self, to: &str, subject: &str, body: String) -> Result<(), String> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| format!("Invalid from address: {e}"))?,
            )
            .to(to.parse().map_err(|e| format!("Invalid to address: {e}"))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| format!("Failed to build email: {e}"))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| format!("Failed to send email: {e}"))?;

        Ok(())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_password_reset(&self, mail: &PasswordResetMail) -> Result<(), String> {
        let body = templates::render_password_reset(mail);
        self.send(&mail.to, templates::PASSWORD_RESET_SUBJECT, body)
            .await
    }
}

/// Used when no SMTP relay is configured; the token only reaches the logs.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_password_reset(&self, mail: &PasswordResetMail) -> Result<(), String> {
        tracing::warn!(
            to = %mail.to,
            "SMTP not configured. Password reset token: {}",
            mail.token
        );
        Ok(())
    }
}
