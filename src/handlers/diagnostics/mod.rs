// Diagnostic handlers: mounted only when ENABLE_TEST_ROUTES is on.

pub mod email;
pub mod whatsapp;

pub use email::test_email;
pub use whatsapp::{test_reminder, test_whatsapp};
