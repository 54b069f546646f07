use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::services::sitemap::{render_robots, render_sitemap};
use crate::state::AppState;

/// GET / - service name, version and endpoint map
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "coachdesk",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health (public)",
            "me": "/api/me (protected)",
            "coach": "/api/coach/clients, /api/coach/sessions?filter=upcoming|past|all (protected)",
            "whatsapp": "/api/whatsapp/conversations[/:id/messages] (protected)",
            "billing": "/api/stripe/customer-portal (public)",
            "diagnostics": "/api/test/whatsapp, /api/test/reminder, /api/test-email (when enabled)",
            "crawlers": "/sitemap.xml, /robots.txt"
        }
    }))
}

/// GET /health - liveness plus a database ping
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}

/// GET /sitemap.xml
pub async fn sitemap(State(state): State<AppState>) -> impl IntoResponse {
    let today = chrono::Utc::now().date_naive();
    (
        [(CONTENT_TYPE, "application/xml; charset=utf-8")],
        render_sitemap(state.config.site.base_url(), today),
    )
}

/// GET /robots.txt
pub async fn robots(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        render_robots(state.config.site.base_url()),
    )
}
