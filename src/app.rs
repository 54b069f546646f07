use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{diagnostics, protected, public};
use crate::middleware::require_identity;
use crate::state::AppState;

/// Full HTTP surface. Diagnostic routes are only mounted when enabled in configuration.
pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()));

    if state.config.site.enable_test_routes {
        tracing::info!("Diagnostic routes enabled under /api/test");
        router = router.merge(diagnostic_routes());
    }

    router
        // Global middleware, outermost first
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/sitemap.xml", get(public::sitemap))
        .route("/robots.txt", get(public::robots))
        .route("/api/stripe/customer-portal", post(public::customer_portal))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{coach, whatsapp};

    Router::new()
        .route("/api/me", get(protected::me))
        .route("/api/coach/clients", get(coach::list_clients))
        .route("/api/coach/sessions", get(coach::list_sessions))
        .route("/api/whatsapp/conversations", get(whatsapp::list_conversations))
        .route(
            "/api/whatsapp/conversations/:id/messages",
            get(whatsapp::list_messages),
        )
        .route_layer(middleware::from_fn_with_state(state, require_identity))
}

fn diagnostic_routes() -> Router<AppState> {
    Router::new()
        .route("/api/test/whatsapp", post(diagnostics::test_whatsapp))
        .route("/api/test/reminder", get(diagnostics::test_reminder))
        .route("/api/test-email", get(diagnostics::test_email))
}
