#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use coachdesk::auth::{AuthError, Identity, IdentityProvider};
use coachdesk::database::{
    ClientRow, Conversation, ConversationWithMessages, Message, Package, Profile, Session,
    SessionFilter, SessionWithClient, Store, StoreError,
};
use coachdesk::database::models::session::UPCOMING_STATUSES;
use coachdesk::services::email::{MailError, MailStatus, Mailer};
use coachdesk::services::stripe::{BillingError, BillingProvider};
use coachdesk::services::whatsapp::{Messenger, MessagingError, Reminder};
use coachdesk::{AppConfig, AppState};

pub const COACH_TOKEN: &str = "coach-token";
pub const OTHER_COACH_TOKEN: &str = "other-coach-token";
pub const CLIENT_TOKEN: &str = "client-token";

/// In-memory rows shared by the fakes and the assertions.
#[derive(Default)]
pub struct Tables {
    pub profiles: Vec<Profile>,
    pub packages: Vec<Package>,
    pub sessions: Vec<Session>,
    pub conversations: Vec<Conversation>,
    pub messages: Vec<Message>,
}

#[derive(Default)]
pub struct MemoryStore {
    pub tables: Mutex<Tables>,
    /// When set, `last_session` for this client fails like a dropped connection.
    pub fail_last_session_for: Mutex<Option<Uuid>>,
    calls: AtomicUsize,
}

impl MemoryStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().expect("tables lock poisoned")
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        self.touch();
        Ok(())
    }

    async fn profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        self.touch();
        Ok(self.lock().profiles.iter().find(|p| p.id == user_id).cloned())
    }

    async fn coach_clients(&self, coach_id: Uuid) -> Result<Vec<ClientRow>, StoreError> {
        self.touch();
        let tables = self.lock();
        let mut rows: Vec<ClientRow> = tables
            .profiles
            .iter()
            .filter(|p| {
                p.role == "client"
                    && tables
                        .sessions
                        .iter()
                        .any(|s| s.coach_id == coach_id && s.user_id == p.id)
            })
            .map(|p| {
                let package = tables
                    .packages
                    .iter()
                    .filter(|pk| pk.user_id == p.id && pk.is_active())
                    .max_by_key(|pk| pk.created_at);
                ClientRow {
                    id: p.id,
                    name: p.name.clone(),
                    email: p.email.clone(),
                    phone: p.phone.clone(),
                    package_id: package.map(|pk| pk.id),
                    package_type: package.map(|pk| pk.package_type.clone()),
                    sessions_remaining: package.map(|pk| pk.sessions_remaining),
                    package_status: package.map(|pk| pk.status.clone()),
                }
            })
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn last_session(
        &self,
        coach_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<Session>, StoreError> {
        self.touch();
        if *self.fail_last_session_for.lock().expect("store lock poisoned") == Some(client_id) {
            return Err(StoreError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(self
            .lock()
            .sessions
            .iter()
            .filter(|s| s.coach_id == coach_id && s.user_id == client_id)
            .max_by_key(|s| s.session_date)
            .cloned())
    }

    async fn coach_sessions(
        &self,
        coach_id: Uuid,
        filter: SessionFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<SessionWithClient>, StoreError> {
        self.touch();
        let tables = self.lock();
        let mut rows: Vec<SessionWithClient> = tables
            .sessions
            .iter()
            .filter(|s| s.coach_id == coach_id && in_window(filter, s, now))
            .map(|s| {
                let client = tables.profiles.iter().find(|p| p.id == s.user_id);
                SessionWithClient {
                    id: s.id,
                    session_date: s.session_date,
                    status: s.status.clone(),
                    client_id: s.user_id,
                    client_name: client.and_then(|c| c.name.clone()),
                    client_email: client.and_then(|c| c.email.clone()),
                    client_phone: client.and_then(|c| c.phone.clone()),
                }
            })
            .collect();
        rows.sort_by(|a, b| b.session_date.cmp(&a.session_date));
        Ok(rows)
    }

    async fn active_package(&self, user_id: Uuid) -> Result<Option<Package>, StoreError> {
        self.touch();
        Ok(self
            .lock()
            .packages
            .iter()
            .filter(|p| p.user_id == user_id && p.is_active())
            .max_by_key(|p| p.created_at)
            .cloned())
    }

    async fn coach_conversations(
        &self,
        coach_id: Uuid,
    ) -> Result<Vec<ConversationWithMessages>, StoreError> {
        self.touch();
        let tables = self.lock();
        let mut conversations: Vec<Conversation> = tables
            .conversations
            .iter()
            .filter(|c| c.coach_id == coach_id)
            .cloned()
            .collect();
        conversations.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));

        Ok(conversations
            .into_iter()
            .map(|conversation| {
                let messages = tables
                    .messages
                    .iter()
                    .filter(|m| m.conversation_id == conversation.id)
                    .cloned()
                    .collect();
                ConversationWithMessages { conversation, messages }
            })
            .collect())
    }

    async fn coach_conversation(
        &self,
        coach_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<Option<Conversation>, StoreError> {
        self.touch();
        Ok(self
            .lock()
            .conversations
            .iter()
            .find(|c| c.id == conversation_id && c.coach_id == coach_id)
            .cloned())
    }

    async fn conversation_messages(
        &self,
        conversation_id: Uuid,
    ) -> Result<Vec<Message>, StoreError> {
        self.touch();
        let mut messages: Vec<Message> = self
            .lock()
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }

    async fn mark_messages_read(
        &self,
        message_ids: &[Uuid],
        read_at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        self.touch();
        let mut updated = 0;
        for message in self.lock().messages.iter_mut() {
            if message_ids.contains(&message.id) && message.is_unread_inbound() {
                message.read_at = Some(read_at);
                updated += 1;
            }
        }
        Ok(updated)
    }
}

/// Same windows the Postgres store builds in SQL.
fn in_window(filter: SessionFilter, session: &Session, now: DateTime<Utc>) -> bool {
    match filter {
        SessionFilter::Upcoming => {
            session.session_date >= now && UPCOMING_STATUSES.contains(&session.status.as_str())
        }
        SessionFilter::Past => session.session_date < now,
        SessionFilter::All => true,
    }
}

/// Maps fixed bearer tokens to user ids.
#[derive(Default)]
pub struct StaticIdentity {
    pub tokens: HashMap<String, Uuid>,
    calls: AtomicUsize,
}

impl StaticIdentity {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn resolve(&self, token: &str) -> Result<Identity, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tokens
            .get(token)
            .map(|id| Identity { user_id: *id, email: None })
            .ok_or_else(|| AuthError::InvalidToken("unknown token".to_string()))
    }
}

#[derive(Default)]
pub struct FakeBilling {
    pub calls: Mutex<Vec<String>>,
    /// When set, every processor call is refused with this message.
    pub fail_with: Mutex<Option<String>>,
}

impl FakeBilling {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("billing lock poisoned").clone()
    }

    pub fn fail_with(&self, message: &str) {
        *self.fail_with.lock().expect("billing lock poisoned") = Some(message.to_string());
    }

    fn refusal(&self) -> Result<(), BillingError> {
        match self.fail_with.lock().expect("billing lock poisoned").clone() {
            Some(message) => Err(BillingError::Api { status: 400, message }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BillingProvider for FakeBilling {
    async fn subscription_customer(&self, subscription_id: &str) -> Result<String, BillingError> {
        self.calls
            .lock()
            .expect("billing lock poisoned")
            .push(format!("subscription:{}", subscription_id));
        self.refusal()?;
        Ok("cus_test".to_string())
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<String, BillingError> {
        self.calls
            .lock()
            .expect("billing lock poisoned")
            .push(format!("portal:{}:{}", customer_id, return_url));
        self.refusal()?;
        Ok(format!("https://billing.example.com/session/{}", customer_id))
    }
}

#[derive(Default)]
pub struct FakeMessenger {
    pub sent: Mutex<Vec<(String, Reminder)>>,
}

impl FakeMessenger {
    pub fn sent(&self) -> Vec<(String, Reminder)> {
        self.sent.lock().expect("messenger lock poisoned").clone()
    }
}

#[async_trait]
impl Messenger for FakeMessenger {
    async fn send_reminder(&self, to: &str, reminder: &Reminder) -> Result<String, MessagingError> {
        let mut sent = self.sent.lock().expect("messenger lock poisoned");
        sent.push((to.to_string(), reminder.clone()));
        Ok(format!("SM{:032}", sent.len()))
    }
}

pub struct FakeMailer {
    pub configured: bool,
    pub sent: Mutex<Vec<String>>,
}

#[async_trait]
impl Mailer for FakeMailer {
    fn status(&self) -> MailStatus {
        MailStatus {
            smtp_host: self.configured.then(|| "smtp.example.com".to_string()),
            smtp_port: 587,
            has_credentials: self.configured,
            from: self.configured.then(|| "noreply@example.com".to_string()),
            to: self.configured.then(|| "coach@example.com".to_string()),
            missing: if self.configured {
                Vec::new()
            } else {
                vec!["SMTP_HOST", "SMTP_USERNAME", "SMTP_PASSWORD"]
            },
        }
    }

    async fn verify(&self) -> Result<bool, MailError> {
        Ok(self.configured)
    }

    async fn send_notification(&self, subject: &str, _html: &str) -> Result<(), MailError> {
        self.sent
            .lock()
            .expect("mailer lock poisoned")
            .push(subject.to_string());
        Ok(())
    }
}

/// Ids of the seeded users.
pub struct Fixture {
    pub coach_id: Uuid,
    pub other_coach_id: Uuid,
    pub alice_id: Uuid,
    pub bob_id: Uuid,
    pub carol_id: Uuid,
}

pub struct TestServer {
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    pub identity: Arc<StaticIdentity>,
    pub billing: Arc<FakeBilling>,
    pub messenger: Arc<FakeMessenger>,
    pub mailer: Arc<FakeMailer>,
    pub fixture: Fixture,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get_as(&self, token: &str, path: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }
}

pub fn profile(id: Uuid, role: &str, name: &str, phone: Option<&str>) -> Profile {
    Profile {
        id,
        role: role.to_string(),
        email: Some(format!("{}@example.com", name.to_lowercase())),
        name: Some(name.to_string()),
        phone: phone.map(str::to_string),
        created_at: Utc::now() - chrono::Duration::days(90),
    }
}

pub fn session(coach_id: Uuid, user_id: Uuid, session_date: DateTime<Utc>, status: &str) -> Session {
    Session {
        id: Uuid::new_v4(),
        coach_id,
        user_id,
        session_date,
        status: status.to_string(),
        created_at: Utc::now() - chrono::Duration::days(30),
    }
}

pub fn message(conversation_id: Uuid, direction: &str, body: &str, minutes_ago: i64) -> Message {
    Message {
        id: Uuid::new_v4(),
        conversation_id,
        direction: direction.to_string(),
        body: body.to_string(),
        created_at: Utc::now() - chrono::Duration::minutes(minutes_ago),
        read_at: None,
    }
}

fn seed() -> (MemoryStore, Fixture) {
    let fixture = Fixture {
        coach_id: Uuid::new_v4(),
        other_coach_id: Uuid::new_v4(),
        alice_id: Uuid::new_v4(),
        bob_id: Uuid::new_v4(),
        carol_id: Uuid::new_v4(),
    };

    let store = MemoryStore::default();
    {
        let mut tables = store.lock();
        tables.profiles = vec![
            profile(fixture.coach_id, "coach", "Coach", None),
            profile(fixture.other_coach_id, "coach", "Other", None),
            profile(fixture.alice_id, "client", "Alice", Some("+41786372553")),
            profile(fixture.bob_id, "client", "Bob", None),
            profile(fixture.carol_id, "client", "Carol", None),
        ];
    }
    (store, fixture)
}

/// Serves the full router on a free port with in-memory collaborators.
/// `vars` become the process-independent configuration.
pub async fn spawn_with<F>(vars: &[(&str, &str)], mailer_configured: bool, populate: F) -> Result<TestServer>
where
    F: FnOnce(&mut Tables, &Fixture),
{
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let config = AppConfig::from_lookup(|key| vars.get(key).cloned());

    let (store, fixture) = seed();
    populate(&mut store.lock(), &fixture);
    let store = Arc::new(store);

    let identity = Arc::new(StaticIdentity {
        tokens: HashMap::from([
            (COACH_TOKEN.to_string(), fixture.coach_id),
            (OTHER_COACH_TOKEN.to_string(), fixture.other_coach_id),
            (CLIENT_TOKEN.to_string(), fixture.alice_id),
        ]),
        ..Default::default()
    });
    let billing = Arc::new(FakeBilling::default());
    let messenger = Arc::new(FakeMessenger::default());
    let mailer = Arc::new(FakeMailer {
        configured: mailer_configured,
        sent: Mutex::new(Vec::new()),
    });

    let state = AppState {
        config: Arc::new(config),
        store: store.clone(),
        identity: identity.clone(),
        billing: billing.clone(),
        messenger: messenger.clone(),
        mailer: mailer.clone(),
    };

    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, coachdesk::app(state)).await;
    });

    let server = TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        store,
        identity,
        billing,
        messenger,
        mailer,
        fixture,
        client: reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?,
    };
    Ok(server)
}

pub async fn spawn() -> Result<TestServer> {
    spawn_with(&[], true, |_, _| {}).await
}
