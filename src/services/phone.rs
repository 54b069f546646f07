use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

pub const WHATSAPP_PREFIX: &str = "whatsapp:";

/// E.164: a plus sign, then 7 to 15 digits with no leading zero.
static E164: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+[1-9]\d{6,14}$").expect("valid E.164 pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhoneError {
    #[error("Phone number is required")]
    Required,

    #[error("Invalid phone number format: {input}")]
    InvalidFormat { input: String },
}

/// Normalises free-form phone text to E.164, e.g. `"+41 78 637 25 53"` to `"+41786372553"`.
pub fn sanitize_phone_number(input: &str) -> Result<String, PhoneError> {
    if input.trim().is_empty() {
        return Err(PhoneError::Required);
    }

    let mut cleaned: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')' | '.'))
        .collect();

    if !cleaned.starts_with('+') {
        cleaned.insert(0, '+');
    }

    if E164.is_match(&cleaned) {
        Ok(cleaned)
    } else {
        Err(PhoneError::InvalidFormat {
            input: input.to_string(),
        })
    }
}

/// Address form the WhatsApp channel expects: `whatsapp:+41786372553`.
pub fn format_whatsapp_number(input: &str) -> Result<String, PhoneError> {
    let number = input.strip_prefix(WHATSAPP_PREFIX).unwrap_or(input);
    Ok(format!("{}{}", WHATSAPP_PREFIX, sanitize_phone_number(number)?))
}
