//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
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
pub mod identity;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - quiz workspace under `/api/v1/quiz/...`
/// - owner library under `/api/v1/library/...`
/// - shared quizzes under `/api/v1/public/...` (no identity required)
/// - Static SPA from `./static` with index fallback
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
        .route("/api/v1/quiz/generate", post(http::http_post_generate))
        .route("/api/v1/quiz/active", get(http::http_get_active))
        .route("/api/v1/quiz/answer", post(http::http_post_answer))
        .route("/api/v1/quiz/save", post(http::http_post_save))
        .route("/api/v1/library", get(http::http_get_library))
        .route("/api/v1/library/:id", delete(http::http_delete_quiz))
        .route("/api/v1/library/:id/load", post(http::http_post_load))
        .route("/api/v1/library/:id/visibility", put(http::http_put_visibility))
        .route("/api/v1/public/:share_id", get(http::http_get_public))
        .route("/api/v1/public/:share_id/score", post(http::http_post_public_score))
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
