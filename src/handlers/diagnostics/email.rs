use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TestEmailQuery {
    #[serde(default)]
    pub send: bool,
}

/// GET /api/test-email - check email settings, the SMTP connection, and optionally send a message
///
/// Diagnostic output: failures echo the underlying error.
pub async fn test_email(
    State(state): State<AppState>,
    Query(query): Query<TestEmailQuery>,
) -> impl IntoResponse {
    let status = state.mailer.status();

    if !status.is_configured() {
        tracing::warn!("Email diagnostic: missing {:?}", status.missing);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Email is not configured",
                "missing": status.missing,
                "config": status
            })),
        );
    }

    match state.mailer.verify().await {
        Ok(true) => {}
        Ok(false) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "SMTP server refused the connection test",
                    "config": status
                })),
            )
        }
        Err(e) => {
            tracing::error!("Email diagnostic connection failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "SMTP connection failed",
                    "details": e.to_string(),
                    "config": status
                })),
            );
        }
    }

    if query.send {
        let html = format!(
            "<p>Test email from coachdesk sent at {}.</p>",
            chrono::Utc::now().to_rfc3339()
        );
        if let Err(e) = state.mailer.send_notification("coachdesk test email", &html).await {
            tracing::error!("Email diagnostic send failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to send test email",
                    "details": e.to_string(),
                    "config": status
                })),
            );
        }
    }

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "connection": "ok",
            "sent": query.send,
            "config": status
        })),
    )
}
