//! HTTP gateway for the support chatbot.
//!
//! Exposes the bot-centric `/api/*` surface (single-message chat with
//! server-kept history, stats, suggestions) and the client-centric `/v1/*`
//! surface (structured transcripts, SSE streaming, lead capture). The router
//! is built by [`build_app`] so integration tests can drive it with
//! `tower::ServiceExt::oneshot` without binding a socket.

pub mod handlers;
pub mod ratelimit;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::http::Method;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use vitabot_core::{BotConfig, LeadMailer, ModelProvider, SessionStore};

pub use ratelimit::RateLimiter;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BotConfig>,
    pub store: Arc<SessionStore>,
    pub provider: Option<Arc<dyn ModelProvider>>,
    pub mailer: Option<Arc<LeadMailer>>,
    pub limiter: Arc<RateLimiter>,
    pub started_at: Instant,
}

/// Builds the full application router over the given state.
pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .route("/api/health", get(handlers::meta::health))
        .route("/api/stats", get(handlers::meta::stats))
        .route("/api/suggestions", get(handlers::meta::suggestions))
        .route(
            "/api/chat",
            get(handlers::meta::chat_info).post(handlers::chat::chat),
        )
        .route("/v1/chat", post(handlers::structured::chat_v1))
        .route("/v1/chat/stream", get(handlers::stream::chat_stream))
        .route("/v1/lead", post(handlers::lead::capture))
        .route("/health", get(handlers::meta::liveness))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            ratelimit::limit,
        ))
        .layer(middleware::from_fn(trace_requests))
        .layer(cors)
        .with_state(state)
}

/// An empty allowlist means any origin is accepted, which keeps local
/// development friction-free. With an allowlist set, only exact origin
/// matches pass the preflight.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if allowed_origins.is_empty() {
        base.allow_origin(Any)
    } else {
        let allowlist: HashSet<String> = allowed_origins.iter().cloned().collect();
        base.allow_origin(AllowOrigin::predicate(move |origin, _| {
            origin
                .to_str()
                .map(|value| allowlist.contains(value))
                .unwrap_or(false)
        }))
    }
}

async fn trace_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        target: "vitabot::http",
        %method,
        path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request handled"
    );
    response
}
