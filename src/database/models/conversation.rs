use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const DIRECTION_INBOUND: &str = "inbound";
pub const DIRECTION_OUTBOUND: &str = "outbound";

/// WhatsApp thread between a coach and one client phone number.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub client_phone: String,
    pub client_name: Option<String>,
    pub status: String,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub direction: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

impl Message {
    pub fn is_inbound(&self) -> bool {
        self.direction == DIRECTION_INBOUND
    }

    /// Sent by the client and not yet seen by the coach.
    pub fn is_unread_inbound(&self) -> bool {
        self.is_inbound() && self.read_at.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct ConversationWithMessages {
    pub conversation: Conversation,
    pub messages: Vec<Message>,
}

impl ConversationWithMessages {
    pub fn unread_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_unread_inbound()).count()
    }

    /// Most recent message by `created_at`; the first one wins a tie.
    pub fn latest_message(&self) -> Option<&Message> {
        self.messages
            .iter()
            .fold(None, |latest: Option<&Message>, m| match latest {
                Some(current) if current.created_at >= m.created_at => Some(current),
                _ => Some(m),
            })
    }
}

pub fn unread_inbound_ids(messages: &[Message]) -> Vec<Uuid> {
    messages
        .iter()
        .filter(|m| m.is_unread_inbound())
        .map(|m| m.id)
        .collect()
}
