//! Health, stats and discovery endpoints.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use vitabot_core::{StoreStats, SUGGESTED_QUESTIONS};

use crate::AppState;

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let (provider, model) = match &state.provider {
        Some(provider) => (provider.source().as_str(), provider.model().to_string()),
        None => ("not_configured", "local".to_string()),
    };
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime": state.started_at.elapsed().as_secs_f64(),
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "provider": provider,
            "model": model,
            "sessions": state.store.len()
        }
    }))
}

pub async fn stats(State(state): State<AppState>) -> Json<StoreStats> {
    Json(state.store.stats())
}

pub async fn suggestions() -> Json<Value> {
    Json(json!({"suggestions": SUGGESTED_QUESTIONS}))
}

/// A GET on the chat endpoint documents how to use it instead of 405ing;
/// people do paste API URLs into browsers.
pub async fn chat_info() -> Json<Value> {
    Json(json!({
        "message": "Отправьте POST запрос с полем message",
        "example": {
            "method": "POST",
            "url": "/api/chat",
            "body": {"message": "Что такое VITAHUB?", "sessionId": "optional"}
        }
    }))
}

/// Bare liveness probe for load balancers.
pub async fn liveness() -> Json<Value> {
    Json(json!({"ok": true}))
}
