pub mod models;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

pub use models::*;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    NotConfigured(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Every read and write the handlers issue against the hosted database.
#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), StoreError>;

    async fn profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError>;

    /// Clients with at least one session booked with this coach.
    async fn coach_clients(&self, coach_id: Uuid) -> Result<Vec<ClientRow>, StoreError>;

    async fn last_session(
        &self,
        coach_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<Session>, StoreError>;

    /// Sessions of a coach inside `filter`, newest first.
    async fn coach_sessions(
        &self,
        coach_id: Uuid,
        filter: SessionFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<SessionWithClient>, StoreError>;

    async fn active_package(&self, user_id: Uuid) -> Result<Option<Package>, StoreError>;

    /// Conversations ordered by `last_message_at` descending, each with its messages.
    async fn coach_conversations(
        &self,
        coach_id: Uuid,
    ) -> Result<Vec<ConversationWithMessages>, StoreError>;

    /// Returns the conversation only when it belongs to `coach_id`.
    async fn coach_conversation(
        &self,
        coach_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<Option<Conversation>, StoreError>;

    /// Messages of a conversation, oldest first.
    async fn conversation_messages(
        &self,
        conversation_id: Uuid,
    ) -> Result<Vec<Message>, StoreError>;

    async fn mark_messages_read(
        &self,
        message_ids: &[Uuid],
        read_at: DateTime<Utc>,
    ) -> Result<u64, StoreError>;
}
