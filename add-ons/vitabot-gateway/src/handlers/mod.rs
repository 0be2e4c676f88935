pub mod chat;
pub mod lead;
pub mod meta;
pub mod stream;
pub mod structured;

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use vitabot_core::BotConfig;

/// Shared-secret check for the `/v1/*` surface. When no token is configured
/// the check is a no-op, which is the intended posture for local development
/// and demo deployments.
pub(crate) fn client_authorized(headers: &HeaderMap, config: &BotConfig) -> bool {
    let Some(expected) = config.client_token.as_deref() else {
        return true;
    };
    headers
        .get("x-client-token")
        .and_then(|value| value.to_str().ok())
        .map(|value| value == expected)
        .unwrap_or(false)
}

pub(crate) fn error_response(status: StatusCode, body: serde_json::Value) -> Response {
    (status, Json(body)).into_response()
}

pub(crate) fn unauthorized() -> Response {
    error_response(StatusCode::UNAUTHORIZED, json!({"error": "unauthorized"}))
}

pub(crate) fn bad_request(details: impl Into<String>) -> Response {
    error_response(
        StatusCode::BAD_REQUEST,
        json!({"error": "bad_request", "details": details.into()}),
    )
}
