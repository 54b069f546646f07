mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use coachdesk::services::whatsapp::Language;

#[tokio::test]
async fn test_whatsapp_normalises_recipient_and_language() -> Result<()> {
    let server = common::spawn().await?;

    let res = server
        .client
        .post(server.url("/api/test/whatsapp"))
        .json(&json!({
            "to": "+41 78 637 25 53",
            "clientName": "Alice",
            "sessionDate": "21/10/2026",
            "sessionTime": "07:30",
            "meetingLink": "https://meet.example.com/abc",
            "language": "EN"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["to"], "whatsapp:+41786372553");
    assert_eq!(body["language"], "en");

    let sent = server.messenger.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "whatsapp:+41786372553");
    assert_eq!(sent[0].1.language, Language::En);
    assert_eq!(sent[0].1.session_time, "07:30");
    Ok(())
}

#[tokio::test]
async fn test_reminder_fills_defaults() -> Result<()> {
    let server = common::spawn_with(
        &[
            ("TWILIO_TEST_RECIPIENT", "+41786372553"),
            ("NEXT_PUBLIC_APP_URL", "https://coach.example.com"),
        ],
        true,
        |_, _| {},
    )
    .await?;

    let res = server.client.get(server.url("/api/test/reminder")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["language"], "fr");

    let sent = server.messenger.sent();
    let reminder = &sent[0].1;
    assert_eq!(reminder.client_name, "Client");
    assert_eq!(reminder.session_time, "18:00");
    assert_eq!(reminder.meeting_link, "https://coach.example.com/dashboard");
    assert_eq!(reminder.language, Language::Fr);
    Ok(())
}

#[tokio::test]
async fn invalid_phone_or_language_is_rejected_without_sending() -> Result<()> {
    let server = common::spawn().await?;
    let url = server.url("/api/test/whatsapp");

    let res = server.client.post(&url).json(&json!({"to": "0041786372553"})).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.json::<Value>().await?["error"],
        "Invalid phone number format: 0041786372553"
    );

    let res = server
        .client
        .post(&url)
        .json(&json!({"to": "+41786372553", "language": "de"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // No recipient and no configured fallback
    let res = server.client.get(server.url("/api/test/reminder")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    assert!(server.messenger.sent().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_whatsapp_rejects_unreadable_bodies_with_json_errors() -> Result<()> {
    let server = common::spawn().await?;
    let url = server.url("/api/test/whatsapp");

    let no_body = server.client.post(&url).send().await?;
    let malformed = server
        .client
        .post(&url)
        .header("Content-Type", "application/json")
        .body("{\"to\": ")
        .send()
        .await?;
    let no_recipient = server.client.post(&url).json(&json!({})).send().await?;

    for res in [no_body, malformed, no_recipient] {
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = res.json::<Value>().await?;
        assert_eq!(body["code"], "BAD_REQUEST");
        assert!(body["error"].is_string());
    }

    assert!(server.messenger.sent().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_email_reports_configuration_and_sends_on_request() -> Result<()> {
    let server = common::spawn().await?;

    let res = server.client.get(server.url("/api/test-email?send=true")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["connection"], "ok");
    assert_eq!(body["sent"], true);
    assert_eq!(server.mailer.sent.lock().expect("mailer lock").len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_email_lists_missing_settings() -> Result<()> {
    let server = common::spawn_with(&[], false, |_, _| {}).await?;

    let res = server.client.get(server.url("/api/test-email")).send().await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = res.json::<Value>().await?;
    assert_eq!(body["missing"], json!(["SMTP_HOST", "SMTP_USERNAME", "SMTP_PASSWORD"]));
    Ok(())
}

#[tokio::test]
async fn diagnostic_routes_are_absent_when_disabled() -> Result<()> {
    let server = common::spawn_with(&[("ENABLE_TEST_ROUTES", "false")], true, |_, _| {}).await?;

    let res = server
        .client
        .post(server.url("/api/test/whatsapp"))
        .json(&json!({"to": "+41786372553"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server.client.get(server.url("/api/test-email")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    assert!(server.messenger.sent().is_empty());
    Ok(())
}
