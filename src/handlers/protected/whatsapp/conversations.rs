use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::database::ConversationWithMessages;
use crate::error::ApiResult;
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ConversationsResponse {
    pub conversations: Vec<ConversationSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: Uuid,
    pub client_phone: String,
    pub client_name: Option<String>,
    pub status: String,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub unread_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<ConversationWithMessages> for ConversationSummary {
    fn from(thread: ConversationWithMessages) -> Self {
        let last_message = thread.latest_message().map(|m| m.body.clone());
        let unread_count = thread.unread_count();
        let conversation = thread.conversation;

        Self {
            id: conversation.id,
            client_phone: conversation.client_phone,
            client_name: conversation.client_name,
            status: conversation.status,
            last_message,
            last_message_at: conversation.last_message_at,
            unread_count,
            created_at: conversation.created_at,
        }
    }
}

/// GET /api/whatsapp/conversations - the caller's threads with last message and unread count
pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<ConversationsResponse>> {
    let threads = state.store.coach_conversations(user.id).await?;

    Ok(Json(ConversationsResponse {
        conversations: threads.into_iter().map(ConversationSummary::from).collect(),
    }))
}
