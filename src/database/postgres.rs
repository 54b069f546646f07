use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::models::conversation::DIRECTION_INBOUND;
use super::models::package::STATUS_ACTIVE;
use super::models::session::UPCOMING_STATUSES;
use super::models::*;
use super::{Store, StoreError};
use crate::config::DatabaseConfig;

/// `Store` backed by the hosted Postgres database.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Builds the pool without opening a connection, so the server can start
    /// while the database is unreachable and report it through `/health`.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or(StoreError::NotConfigured("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_lazy(url)?;

        info!(
            "Created database pool (max {} connections)",
            config.max_connections
        );
        Ok(Self { pool })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT id, role, email, name, phone, created_at FROM profiles WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn coach_clients(&self, coach_id: Uuid) -> Result<Vec<ClientRow>, StoreError> {
        let rows = sqlx::query_as::<_, ClientRow>(
            r#"
            SELECT
                p.id, p.name, p.email, p.phone,
                pk.id AS package_id,
                pk.type AS package_type,
                pk.sessions_remaining,
                pk.status AS package_status
            FROM profiles p
            LEFT JOIN LATERAL (
                SELECT id, type, sessions_remaining, status
                FROM packages
                WHERE user_id = p.id AND status = $2
                ORDER BY created_at DESC
                LIMIT 1
            ) pk ON TRUE
            WHERE p.role = 'client'
              AND EXISTS (
                SELECT 1 FROM sessions s
                WHERE s.user_id = p.id AND s.coach_id = $1
              )
            ORDER BY p.name ASC NULLS LAST, p.id ASC
            "#,
        )
        .bind(coach_id)
        .bind(STATUS_ACTIVE)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn last_session(
        &self,
        coach_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<Session>, StoreError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, coach_id, user_id, session_date, status, created_at
            FROM sessions
            WHERE coach_id = $1 AND user_id = $2
            ORDER BY session_date DESC
            LIMIT 1
            "#,
        )
        .bind(coach_id)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    async fn coach_sessions(
        &self,
        coach_id: Uuid,
        filter: SessionFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<SessionWithClient>, StoreError> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT
                s.id, s.session_date, s.status,
                p.id AS client_id,
                p.name AS client_name,
                p.email AS client_email,
                p.phone AS client_phone
            FROM sessions s
            JOIN profiles p ON p.id = s.user_id
            WHERE s.coach_id = "#,
        );
        query.push_bind(coach_id);

        match filter {
            SessionFilter::Upcoming => {
                let statuses: Vec<String> =
                    UPCOMING_STATUSES.iter().map(|s| s.to_string()).collect();
                query
                    .push(" AND s.session_date >= ")
                    .push_bind(now)
                    .push(" AND s.status = ANY(")
                    .push_bind(statuses)
                    .push(")");
            }
            SessionFilter::Past => {
                query.push(" AND s.session_date < ").push_bind(now);
            }
            SessionFilter::All => {}
        }

        query.push(" ORDER BY s.session_date DESC");

        let rows = query
            .build_query_as::<SessionWithClient>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn active_package(&self, user_id: Uuid) -> Result<Option<Package>, StoreError> {
        let package = sqlx::query_as::<_, Package>(
            r#"
            SELECT id, user_id, type, sessions_remaining, status, stripe_subscription_id, created_at
            FROM packages
            WHERE user_id = $1 AND status = $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(STATUS_ACTIVE)
        .fetch_optional(&self.pool)
        .await?;
        Ok(package)
    }

    async fn coach_conversations(
        &self,
        coach_id: Uuid,
    ) -> Result<Vec<ConversationWithMessages>, StoreError> {
        let conversations = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, coach_id, client_phone, client_name, status, last_message_at, created_at
            FROM whatsapp_conversations
            WHERE coach_id = $1
            ORDER BY last_message_at DESC NULLS LAST
            "#,
        )
        .bind(coach_id)
        .fetch_all(&self.pool)
        .await?;

        if conversations.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = conversations.iter().map(|c| c.id).collect();
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, conversation_id, direction, body, created_at, read_at
            FROM whatsapp_messages
            WHERE conversation_id = ANY($1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_conversation: HashMap<Uuid, Vec<Message>> = HashMap::new();
        for message in messages {
            by_conversation
                .entry(message.conversation_id)
                .or_default()
                .push(message);
        }

        Ok(conversations
            .into_iter()
            .map(|conversation| ConversationWithMessages {
                messages: by_conversation.remove(&conversation.id).unwrap_or_default(),
                conversation,
            })
            .collect())
    }

    async fn coach_conversation(
        &self,
        coach_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<Option<Conversation>, StoreError> {
        let conversation = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, coach_id, client_phone, client_name, status, last_message_at, created_at
            FROM whatsapp_conversations
            WHERE id = $1 AND coach_id = $2
            "#,
        )
        .bind(conversation_id)
        .bind(coach_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(conversation)
    }

    async fn conversation_messages(
        &self,
        conversation_id: Uuid,
    ) -> Result<Vec<Message>, StoreError> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, conversation_id, direction, body, created_at, read_at
            FROM whatsapp_messages
            WHERE conversation_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    async fn mark_messages_read(
        &self,
        message_ids: &[Uuid],
        read_at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        // read_at only ever moves from NULL to a timestamp
        let result = sqlx::query(
            r#"
            UPDATE whatsapp_messages
            SET read_at = $1
            WHERE id = ANY($2) AND direction = $3 AND read_at IS NULL
            "#,
        )
        .bind(read_at)
        .bind(message_ids)
        .bind(DIRECTION_INBOUND)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
