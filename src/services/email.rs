use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::EmailConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Email is not configured: missing {}", .0.join(", "))]
    NotConfigured(Vec<&'static str>),

    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build email: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Which email settings are present. Never carries secrets.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MailStatus {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub has_credentials: bool,
    pub from: Option<String>,
    pub to: Option<String>,
    pub missing: Vec<&'static str>,
}

impl MailStatus {
    pub fn is_configured(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Notification mail from the configured sender to the configured recipient.
#[async_trait]
pub trait Mailer: Send + Sync {
    fn status(&self) -> MailStatus;

    /// Opens a connection to the relay without sending anything.
    async fn verify(&self) -> Result<bool, MailError>;

    async fn send_notification(&self, subject: &str, html: &str) -> Result<(), MailError>;
}

#[derive(Debug, Clone)]
pub struct SmtpMailer {
    config: EmailConfig,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailError> {
        let status = self.status();
        if !status.is_configured() {
            return Err(MailError::NotConfigured(status.missing));
        }
        let host = self.config.smtp_host.as_deref().unwrap_or_default();

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)?.port(self.config.smtp_port);
        if let (Some(user), Some(pass)) = (&self.config.smtp_username, &self.config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }
        Ok(builder.build())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    fn status(&self) -> MailStatus {
        let mut missing = Vec::new();
        if self.config.smtp_host.is_none() {
            missing.push("SMTP_HOST");
        }
        if self.config.from_email.is_none() {
            missing.push("NOTIFICATION_FROM_EMAIL");
        }
        if self.config.to_email.is_none() {
            missing.push("NOTIFICATION_TO_EMAIL");
        }

        MailStatus {
            smtp_host: self.config.smtp_host.clone(),
            smtp_port: self.config.smtp_port,
            has_credentials: self.config.smtp_username.is_some()
                && self.config.smtp_password.is_some(),
            from: self.config.from_email.clone(),
            to: self.config.to_email.clone(),
            missing,
        }
    }

    async fn verify(&self) -> Result<bool, MailError> {
        Ok(self.transport()?.test_connection().await?)
    }

    async fn send_notification(&self, subject: &str, html: &str) -> Result<(), MailError> {
        let transport = self.transport()?;
        let from: Mailbox = self.config.from_email.as_deref().unwrap_or_default().parse()?;
        let to: Mailbox = self.config.to_email.as_deref().unwrap_or_default().parse()?;

        let email = Message::builder()
            .from(from)
            .to(to.clone())
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())?;

        transport.send(email).await?;
        info!("Notification email '{}' sent to {}", subject, to);
        Ok(())
    }
}
