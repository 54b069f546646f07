use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

use super::phone::{format_whatsapp_number, PhoneError};
use crate::config::WhatsAppConfig;

#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("WhatsApp messaging is not configured: missing {0}")]
    NotConfigured(&'static str),

    #[error("Invalid WhatsApp sender number: {0}")]
    InvalidSender(PhoneError),

    #[error("Twilio request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Fr,
    En,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fr" => Ok(Language::Fr),
            "en" => Ok(Language::En),
            other => Err(format!("Unsupported language '{}': expected fr or en", other)),
        }
    }
}

/// Values substituted into the session reminder template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub client_name: String,
    pub session_date: String,
    pub session_time: String,
    pub meeting_link: String,
    pub language: Language,
}

impl Reminder {
    /// Template placeholders are positional: {{1}} name, {{2}} date, {{3}} time, {{4}} link.
    pub fn content_variables(&self) -> serde_json::Value {
        json!({
            "1": self.client_name,
            "2": self.session_date,
            "3": self.session_time,
            "4": self.meeting_link,
        })
    }
}

#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends the reminder template to a `whatsapp:+...` address and returns the provider message id.
    async fn send_reminder(&self, to: &str, reminder: &Reminder) -> Result<String, MessagingError>;
}

#[derive(Debug, Clone)]
pub struct TwilioClient {
    client: Client,
    config: WhatsAppConfig,
}

#[derive(Debug, Deserialize)]
struct TwilioMessage {
    sid: String,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    code: Option<i64>,
    message: Option<String>,
}

impl TwilioClient {
    pub fn new(config: &WhatsAppConfig) -> Self {
        Self {
            client: Client::new(),
            config: config.clone(),
        }
    }

    fn template_for(&self, language: Language) -> Result<&str, MessagingError> {
        match language {
            Language::Fr => self
                .config
                .template_fr
                .as_deref()
                .ok_or(MessagingError::NotConfigured("TWILIO_TEMPLATE_REMINDER_FR")),
            Language::En => self
                .config
                .template_en
                .as_deref()
                .ok_or(MessagingError::NotConfigured("TWILIO_TEMPLATE_REMINDER_EN")),
        }
    }
}

#[async_trait]
impl Messenger for TwilioClient {
    async fn send_reminder(&self, to: &str, reminder: &Reminder) -> Result<String, MessagingError> {
        let account_sid = self
            .config
            .account_sid
            .as_deref()
            .ok_or(MessagingError::NotConfigured("TWILIO_ACCOUNT_SID"))?;
        let auth_token = self
            .config
            .auth_token
            .as_deref()
            .ok_or(MessagingError::NotConfigured("TWILIO_AUTH_TOKEN"))?;
        let from = self
            .config
            .from_number
            .as_deref()
            .ok_or(MessagingError::NotConfigured("TWILIO_WHATSAPP_FROM"))
            .and_then(|n| format_whatsapp_number(n).map_err(MessagingError::InvalidSender))?;
        let template = self.template_for(reminder.language)?;

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            account_sid
        );
        let variables = reminder.content_variables().to_string();

        let response = self
            .client
            .post(&url)
            .basic_auth(account_sid, Some(auth_token))
            .form(&[
                ("From", from.as_str()),
                ("To", to),
                ("ContentSid", template),
                ("ContentVariables", variables.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: Option<TwilioErrorBody> = response.json().await.ok();
            let code = body.as_ref().and_then(|b| b.code);
            let message = body
                .and_then(|b| b.message)
                .unwrap_or_else(|| format!("Twilio API error ({})", status));
            return Err(MessagingError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        let message: TwilioMessage = response.json().await?;
        info!(
            "WhatsApp reminder {} sent to {} ({})",
            message.sid,
            to,
            message.status.as_deref().unwrap_or("unknown")
        );
        Ok(message.sid)
    }
}
