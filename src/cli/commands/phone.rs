use clap::Args;
use serde_json::json;

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::services::{format_whatsapp_number, sanitize_phone_number};

#[derive(Args)]
pub struct PhoneArgs {
    #[arg(help = "Phone number in any common notation")]
    pub input: String,

    #[arg(long, help = "Print the WhatsApp channel address instead")]
    pub whatsapp: bool,
}

pub fn handle(args: PhoneArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let result = if args.whatsapp {
        format_whatsapp_number(&args.input)
    } else {
        sanitize_phone_number(&args.input)
    };

    match result {
        Ok(normalized) => {
            if matches!(output_format, OutputFormat::Text) {
                println!("{}", normalized);
                return Ok(());
            }
            output_success(
                &output_format,
                "Phone number is valid",
                Some(json!({ "input": args.input, "normalized": normalized })),
            )
        }
        Err(e) => {
            output_error(&output_format, &e.to_string(), Some(json!({ "input": args.input })))?;
            anyhow::bail!(e)
        }
    }
}
