//! Lead capture (`POST /v1/lead`).
//!
//! Validation is synchronous; email delivery is fire-and-forget so a slow or
//! broken SMTP relay never delays the 200 to the widget.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;
use vitabot_core::Lead;

use super::{bad_request, client_authorized, unauthorized};
use crate::AppState;

pub async fn capture(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !client_authorized(&headers, &state.config) {
        return unauthorized();
    }

    let lead: Lead = match serde_json::from_value(body) {
        Ok(lead) => lead,
        Err(error) => return bad_request(error.to_string()),
    };
    if let Err(details) = lead.validate() {
        return bad_request(details);
    }

    let id = Uuid::new_v4().to_string();
    tracing::info!(target: "vitabot::lead", id = %id, session = %lead.session_id, "lead captured");

    if let Some(mailer) = state.mailer.clone() {
        let task_id = id.clone();
        // lettre's SmtpTransport is blocking
        tokio::task::spawn_blocking(move || {
            if let Err(error) = mailer.send_lead(&task_id, &lead) {
                tracing::warn!(target: "vitabot::lead", id = %task_id, %error, "lead email failed");
            }
        });
    }

    Json(json!({"ok": true, "id": id})).into_response()
}
