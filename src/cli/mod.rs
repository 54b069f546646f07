pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "coachctl")]
#[command(about = "coachctl - operator tools for the coachdesk API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Normalise a phone number to E.164")]
    Phone(commands::phone::PhoneArgs),

    #[command(about = "Print the marketing sitemap or robots.txt")]
    Sitemap(commands::sitemap::SitemapArgs),

    #[command(about = "Send WhatsApp notifications")]
    Notify {
        #[command(subcommand)]
        cmd: commands::notify::NotifyCommands,
    },

    #[command(about = "Email provider diagnostics")]
    Email {
        #[command(subcommand)]
        cmd: commands::email::EmailCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Phone(args) => commands::phone::handle(args, output_format),
        Commands::Sitemap(args) => commands::sitemap::handle(args),
        Commands::Notify { cmd } => commands::notify::handle(cmd, output_format).await,
        Commands::Email { cmd } => commands::email::handle(cmd, output_format).await,
    }
}
