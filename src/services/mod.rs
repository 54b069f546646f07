pub mod email;
pub mod phone;
pub mod sitemap;
pub mod stripe;
pub mod whatsapp;

pub use email::{Mailer, SmtpMailer};
pub use phone::{format_whatsapp_number, sanitize_phone_number};
pub use stripe::{BillingProvider, StripeClient};
pub use whatsapp::{Messenger, TwilioClient};
