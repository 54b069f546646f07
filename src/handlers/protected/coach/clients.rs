use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::Serialize;
use uuid::Uuid;

use crate::database::{ClientRow, Session};
use crate::error::ApiResult;
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ClientsResponse {
    pub clients: Vec<CoachClient>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachClient {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub package: Option<ClientPackage>,
    pub last_session: Option<LastSession>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPackage {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub package_type: Option<String>,
    pub sessions_remaining: Option<i32>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastSession {
    pub id: Uuid,
    pub session_date: DateTime<Utc>,
    pub status: String,
}

impl CoachClient {
    fn new(row: ClientRow, last_session: Option<Session>) -> Self {
        let package = row.package_id.map(|id| ClientPackage {
            id,
            package_type: row.package_type,
            sessions_remaining: row.sessions_remaining,
            status: row.package_status,
        });

        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            package,
            last_session: last_session.map(|s| LastSession {
                id: s.id,
                session_date: s.session_date,
                status: s.status,
            }),
        }
    }
}

/// GET /api/coach/clients - clients who booked with the caller, with package and latest session
pub async fn list_clients(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<ClientsResponse>> {
    let rows = state.store.coach_clients(user.id).await?;

    // One lookup per client, run together; output keeps the client order
    let last_sessions = try_join_all(
        rows.iter()
            .map(|row| state.store.last_session(user.id, row.id)),
    )
    .await?;

    let clients = rows
        .into_iter()
        .zip(last_sessions)
        .map(|(row, last)| CoachClient::new(row, last))
        .collect();

    Ok(Json(ClientsResponse { clients }))
}
