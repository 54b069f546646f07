use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::database::models::conversation::unread_inbound_ids;
use crate::database::Message;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
}

/// GET /api/whatsapp/conversations/:id/messages - thread history, oldest first
///
/// Viewing a thread marks its unread inbound messages as read. The response
/// shows `read_at` as it was before that update.
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(conversation_id): Path<String>,
) -> ApiResult<Json<MessagesResponse>> {
    let not_found = || ApiError::not_found("Conversation not found");

    // A malformed id cannot name one of the caller's conversations
    let conversation_id = Uuid::parse_str(&conversation_id).map_err(|_| not_found())?;

    state
        .store
        .coach_conversation(user.id, conversation_id)
        .await?
        .ok_or_else(not_found)?;

    let messages = state.store.conversation_messages(conversation_id).await?;

    let unread_ids = unread_inbound_ids(&messages);
    if !unread_ids.is_empty() {
        let updated = state.store.mark_messages_read(&unread_ids, Utc::now()).await?;
        tracing::info!(
            "Marked {} message(s) read in conversation {}",
            updated,
            conversation_id
        );
    }

    Ok(Json(MessagesResponse { messages }))
}
