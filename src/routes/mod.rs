//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Uploaded course documents can be far larger than axum's 2 MiB default.
const UPLOAD_LIMIT: usize = 50 * 1024 * 1024;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers) – adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/sessions", post(http::http_create_session))
        .route("/api/v1/sessions/:id", get(http::http_get_session))
        .route(
            "/api/v1/sessions/:id/upload",
            post(http::http_upload).layer(DefaultBodyLimit::max(UPLOAD_LIMIT)),
        )
        .route(
            "/api/v1/sessions/:id/view",
            get(http::http_get_view).put(http::http_put_view),
        )
        .route("/api/v1/sessions/:id/quiz", get(http::http_get_quiz))
        .route("/api/v1/sessions/:id/quiz/answer", post(http::http_post_answer))
        .route("/api/v1/sessions/:id/quiz/submit", post(http::http_post_submit))
        .route("/api/v1/sessions/:id/quiz/retake", post(http::http_post_retake))
        .route("/api/v1/sessions/:id/export", post(http::http_post_export))
        .route(
            "/api/v1/sessions/:id/chat",
            get(http::http_get_chat)
                .post(http::http_post_chat)
                .delete(http::http_delete_chat),
        )
        .route("/api/v1/auth/register", post(http::http_register))
        .route("/api/v1/auth/login", post(http::http_login))
        .route("/api/v1/contact", post(http::http_contact))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}
