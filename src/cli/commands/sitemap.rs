use clap::Args;

use crate::config::AppConfig;
use crate::services::sitemap::{render_robots, render_sitemap};

#[derive(Args)]
pub struct SitemapArgs {
    #[arg(long, help = "Public base URL (defaults to NEXT_PUBLIC_APP_URL)")]
    pub base_url: Option<String>,

    #[arg(long, help = "Print robots.txt instead of the sitemap")]
    pub robots: bool,
}

pub fn handle(args: SitemapArgs) -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    let base_url = args
        .base_url
        .unwrap_or_else(|| config.site.base_url().to_string());

    if args.robots {
        print!("{}", render_robots(&base_url));
    } else {
        print!("{}", render_sitemap(&base_url, chrono::Utc::now().date_naive()));
    }
    Ok(())
}
