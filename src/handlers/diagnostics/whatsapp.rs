use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::services::format_whatsapp_number;
use crate::services::whatsapp::{Language, Reminder};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestWhatsAppRequest {
    pub to: Option<String>,
    pub client_name: Option<String>,
    pub session_date: Option<String>,
    pub session_time: Option<String>,
    pub meeting_link: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestReminderQuery {
    pub to: Option<String>,
    pub client_name: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub link: Option<String>,
    pub lang: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResponse {
    pub success: bool,
    pub message_sid: String,
    pub to: String,
    pub language: Language,
}

/// POST /api/test/whatsapp - send the reminder template with caller-supplied values
pub async fn test_whatsapp(
    State(state): State<AppState>,
    body: Option<Json<TestWhatsAppRequest>>,
) -> ApiResult<Json<DispatchResponse>> {
    let Json(req) = body.ok_or_else(|| ApiError::bad_request("Request body must be a JSON object"))?;
    let to = req
        .to
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Recipient phone number is required"))?;
    let reminder = build_reminder(
        &state,
        req.client_name,
        req.session_date,
        req.session_time,
        req.meeting_link,
        req.language.as_deref(),
    )?;

    dispatch(&state, &to, reminder).await
}

/// GET /api/test/reminder - send a sample reminder, falling back to the configured test recipient
pub async fn test_reminder(
    State(state): State<AppState>,
    Query(query): Query<TestReminderQuery>,
) -> ApiResult<Json<DispatchResponse>> {
    let to = query
        .to
        .filter(|t| !t.trim().is_empty())
        .or_else(|| state.config.whatsapp.test_recipient.clone())
        .ok_or_else(|| {
            ApiError::bad_request("Recipient phone number is required (or set TWILIO_TEST_RECIPIENT)")
        })?;
    let reminder = build_reminder(
        &state,
        query.client_name,
        query.date,
        query.time,
        query.link,
        query.lang.as_deref(),
    )?;

    dispatch(&state, &to, reminder).await
}

/// Fills omitted fields with a session tomorrow at 18:00 and a link to the dashboard.
fn build_reminder(
    state: &AppState,
    client_name: Option<String>,
    session_date: Option<String>,
    session_time: Option<String>,
    meeting_link: Option<String>,
    language: Option<&str>,
) -> ApiResult<Reminder> {
    let language = match language.map(str::trim).filter(|l| !l.is_empty()) {
        Some(raw) => raw.parse::<Language>().map_err(ApiError::bad_request)?,
        None => Language::default(),
    };
    let tomorrow = Utc::now() + Duration::days(1);

    Ok(Reminder {
        client_name: client_name.unwrap_or_else(|| "Client".to_string()),
        session_date: session_date
            .unwrap_or_else(|| tomorrow.format("%d/%m/%Y").to_string()),
        session_time: session_time.unwrap_or_else(|| "18:00".to_string()),
        meeting_link: meeting_link
            .unwrap_or_else(|| format!("{}/dashboard", state.config.site.base_url())),
        language,
    })
}

async fn dispatch(
    state: &AppState,
    to: &str,
    reminder: Reminder,
) -> ApiResult<Json<DispatchResponse>> {
    let address = format_whatsapp_number(to)?;
    let message_sid = state.messenger.send_reminder(&address, &reminder).await?;

    Ok(Json(DispatchResponse {
        success: true,
        message_sid,
        to: address,
        language: reminder.language,
    }))
}
