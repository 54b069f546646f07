use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::services::email::{Mailer, SmtpMailer};

#[derive(Subcommand)]
pub enum EmailCommands {
    #[command(about = "Check email settings and the SMTP connection")]
    Check {
        #[arg(long, help = "Also send a test message to NOTIFICATION_TO_EMAIL")]
        send: bool,
    },
}

pub async fn handle(cmd: EmailCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        EmailCommands::Check { send } => {
            let config = AppConfig::from_env();
            let mailer = SmtpMailer::new(&config.email);
            let status = mailer.status();

            if !status.is_configured() {
                output_error(
                    &output_format,
                    "Email is not configured",
                    Some(json!({ "missing": status.missing })),
                )?;
                anyhow::bail!("missing {}", status.missing.join(", "));
            }

            if !mailer.verify().await? {
                anyhow::bail!("SMTP server refused the connection test");
            }

            if send {
                mailer
                    .send_notification("coachdesk test email", "<p>Test email from coachctl.</p>")
                    .await?;
            }

            output_success(
                &output_format,
                if send { "SMTP connection ok, test email sent" } else { "SMTP connection ok" },
                Some(json!({ "config": status, "sent": send })),
            )
        }
    }
}
