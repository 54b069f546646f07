use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_ACTIVE: &str = "active";

/// A purchased bundle of coaching sessions, optionally backed by a Stripe subscription.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Package {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub package_type: String,
    pub sessions_remaining: i32,
    pub status: String,
    pub stripe_subscription_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Package {
    pub fn is_active(&self) -> bool {
        self.status == STATUS_ACTIVE
    }

    /// Subscription reference, ignoring blank values left behind by manual edits.
    pub fn subscription_id(&self) -> Option<&str> {
        self.stripe_subscription_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}
