// Protected handlers: every route here sits behind `require_identity`,
// which resolves the bearer token and injects `AuthUser`.

pub mod coach;
pub mod me;
pub mod whatsapp;

pub use me::me;
