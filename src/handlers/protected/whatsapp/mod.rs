pub mod conversations;
pub mod messages;

pub use conversations::list_conversations;
pub use messages::list_messages;
