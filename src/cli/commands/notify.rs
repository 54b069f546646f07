use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::services::format_whatsapp_number;
use crate::services::whatsapp::{Language, Messenger, Reminder, TwilioClient};

#[derive(Subcommand)]
pub enum NotifyCommands {
    #[command(about = "Send a session reminder over WhatsApp")]
    Reminder {
        #[arg(long, help = "Recipient phone (defaults to TWILIO_TEST_RECIPIENT)")]
        to: Option<String>,
        #[arg(long, default_value = "Client", help = "Client name")]
        name: String,
        #[arg(long, help = "Session date as shown to the client (defaults to tomorrow)")]
        date: Option<String>,
        #[arg(long, default_value = "18:00", help = "Session time as shown to the client")]
        time: String,
        #[arg(long, help = "Meeting link (defaults to the dashboard URL)")]
        link: Option<String>,
        #[arg(long, default_value = "fr", help = "Template language: fr or en")]
        lang: String,
    },
}

pub async fn handle(cmd: NotifyCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        NotifyCommands::Reminder { to, name, date, time, link, lang } => {
            let config = AppConfig::from_env();
            let to = to
                .or_else(|| config.whatsapp.test_recipient.clone())
                .ok_or_else(|| anyhow::anyhow!("--to is required when TWILIO_TEST_RECIPIENT is unset"))?;
            let language: Language = lang.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            let address = format_whatsapp_number(&to)?;

            let reminder = Reminder {
                client_name: name,
                session_date: date.unwrap_or_else(|| {
                    (chrono::Utc::now() + chrono::Duration::days(1))
                        .format("%d/%m/%Y")
                        .to_string()
                }),
                session_time: time,
                meeting_link: link
                    .unwrap_or_else(|| format!("{}/dashboard", config.site.base_url())),
                language,
            };

            let sid = TwilioClient::new(&config.whatsapp)
                .send_reminder(&address, &reminder)
                .await?;

            output_success(
                &output_format,
                &format!("Reminder {} sent to {}", sid, address),
                Some(json!({ "messageSid": sid, "to": address })),
            )
        }
    }
}
