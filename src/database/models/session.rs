use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

pub const STATUS_SCHEDULED: &str = "scheduled";
pub const STATUS_RESCHEDULED: &str = "rescheduled";

/// Statuses that still count as upcoming once the date is in the future.
pub const UPCOMING_STATUSES: [&str; 2] = [STATUS_SCHEDULED, STATUS_RESCHEDULED];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub user_id: Uuid,
    pub session_date: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Session joined with the client profile it was booked for.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionWithClient {
    pub id: Uuid,
    pub session_date: DateTime<Utc>,
    pub status: String,
    pub client_id: Uuid,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
}

/// Client profile joined with its most recent active package, if any.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClientRow {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub package_id: Option<Uuid>,
    pub package_type: Option<String>,
    pub sessions_remaining: Option<i32>,
    pub package_status: Option<String>,
}

/// Window applied by the store: upcoming is dated now or later with an open
/// status, past is dated before now whatever its status, all is everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionFilter {
    #[default]
    Upcoming,
    Past,
    All,
}

impl SessionFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionFilter::Upcoming => "upcoming",
            SessionFilter::Past => "past",
            SessionFilter::All => "all",
        }
    }
}

impl FromStr for SessionFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(SessionFilter::Upcoming),
            "past" => Ok(SessionFilter::Past),
            "all" => Ok(SessionFilter::All),
            other => Err(format!(
                "Invalid filter '{}': expected upcoming, past or all",
                other
            )),
        }
    }
}
