pub mod clients;
pub mod sessions;

pub use clients::list_clients;
pub use sessions::list_sessions;
