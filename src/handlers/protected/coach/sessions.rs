use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::{SessionFilter, SessionWithClient};
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SessionsQuery {
    pub filter: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionsResponse {
    pub sessions: Vec<CoachSession>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachSession {
    pub id: Uuid,
    pub session_date: DateTime<Utc>,
    pub status: String,
    pub client: SessionClient,
}

#[derive(Debug, Serialize)]
pub struct SessionClient {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<SessionWithClient> for CoachSession {
    fn from(row: SessionWithClient) -> Self {
        Self {
            id: row.id,
            session_date: row.session_date,
            status: row.status,
            client: SessionClient {
                id: row.client_id,
                name: row.client_name,
                email: row.client_email,
                phone: row.client_phone,
            },
        }
    }
}

/// GET /api/coach/sessions?filter=upcoming|past|all - the caller's sessions, newest first
pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<SessionsQuery>,
) -> ApiResult<Json<SessionsResponse>> {
    let now = Utc::now();
    let filter = match query.filter.as_deref() {
        None | Some("") => SessionFilter::default(),
        Some(raw) => raw.parse::<SessionFilter>().map_err(ApiError::bad_request)?,
    };

    let rows = state.store.coach_sessions(user.id, filter, now).await?;
    tracing::debug!(
        "Coach {} has {} {} sessions",
        user.id,
        rows.len(),
        filter.as_str()
    );

    Ok(Json(SessionsResponse {
        sessions: rows.into_iter().map(CoachSession::from).collect(),
    }))
}
