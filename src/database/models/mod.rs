pub mod conversation;
pub mod package;
pub mod profile;
pub mod session;

pub use conversation::{Conversation, ConversationWithMessages, Message};
pub use package::Package;
pub use profile::{Profile, Role};
pub use session::{ClientRow, Session, SessionFilter, SessionWithClient};
