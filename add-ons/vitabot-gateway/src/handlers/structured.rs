//! Structured transcript chat (`POST /v1/chat`).
//!
//! The client owns the conversation history here: it sends the full message
//! list each time and the server only prepends the system prompt. Unlike
//! `/api/chat` this surface has no canned fallback; without a working model
//! provider the request is rejected.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use vitabot_core::{PromptBuilder, Role, Turn};

use super::{bad_request, client_authorized, unauthorized};
use crate::AppState;

const MAX_MESSAGES: usize = 20;
const MAX_CONTENT_CHARS: usize = 4000;

#[derive(Debug, Deserialize)]
struct ChatV1Request {
    // both ids are required; a missing field fails deserialization and the
    // request gets a 400
    #[serde(rename = "sessionId")]
    session_id: String,
    #[serde(rename = "companyId")]
    company_id: String,
    #[serde(default)]
    messages: Vec<IncomingMessage>,
}

#[derive(Debug, Deserialize)]
struct IncomingMessage {
    role: String,
    content: String,
}

pub async fn chat_v1(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !client_authorized(&headers, &state.config) {
        return unauthorized();
    }

    let request: ChatV1Request = match serde_json::from_value(body) {
        Ok(request) => request,
        Err(error) => return bad_request(error.to_string()),
    };
    let turns = match validate(&request) {
        Ok(turns) => turns,
        Err(details) => return bad_request(details),
    };

    let Some(provider) = &state.provider else {
        return bad_request("no model provider is configured");
    };

    let builder = PromptBuilder::new(&request.company_id, state.config.max_history_turns);
    let messages = builder.wrap_messages(&turns);

    match provider.generate(&messages, state.config.timeout).await {
        Ok(reply) => Json(json!({"reply": reply})).into_response(),
        Err(error) => {
            tracing::warn!(target: "vitabot::chat", %error, "structured chat failed");
            bad_request(error.to_string())
        }
    }
}

fn validate(request: &ChatV1Request) -> Result<Vec<Turn>, String> {
    if request.session_id.chars().count() < 6 {
        return Err("sessionId must be at least 6 characters".to_string());
    }
    if request.company_id.chars().count() < 2 {
        return Err("companyId must be at least 2 characters".to_string());
    }
    if request.messages.is_empty() {
        return Err("messages must contain at least one entry".to_string());
    }
    if request.messages.len() > MAX_MESSAGES {
        return Err(format!("messages must contain at most {MAX_MESSAGES} entries"));
    }

    let mut turns = Vec::with_capacity(request.messages.len());
    for (index, message) in request.messages.iter().enumerate() {
        let role = match message.role.as_str() {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            "system" => Role::System,
            other => return Err(format!("messages[{index}].role is invalid: {other:?}")),
        };
        let chars = message.content.chars().count();
        if chars == 0 {
            return Err(format!("messages[{index}].content must not be empty"));
        }
        if chars > MAX_CONTENT_CHARS {
            return Err(format!(
                "messages[{index}].content exceeds {MAX_CONTENT_CHARS} characters"
            ));
        }
        turns.push(Turn {
            role,
            content: message.content.clone(),
        });
    }
    Ok(turns)
}
