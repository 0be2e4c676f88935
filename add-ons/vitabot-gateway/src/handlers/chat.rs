//! Single-message chat with server-kept history (`POST /api/chat`).
//!
//! The bot always answers: a provider failure or missing provider downgrades
//! the reply to the canned engine instead of surfacing an error to the
//! visitor.

use std::error::Error;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use vitabot_core::{
    canned_reply, follow_up_suggestions, new_session_id, PromptBuilder, ReplySource, Turn,
};

use super::error_response;
use crate::AppState;

pub async fn chat(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    let started = Instant::now();
    match handle_turn(&state, body, started).await {
        Ok(response) => response,
        Err(error) => {
            tracing::error!(target: "vitabot::chat", %error, "unhandled error in chat turn");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "Внутренняя ошибка сервера",
                    "message": "Попробуйте еще раз через несколько секунд",
                    "code": "INTERNAL_ERROR"
                }),
            )
        }
    }
}

async fn handle_turn(
    state: &AppState,
    body: Value,
    started: Instant,
) -> Result<Response, Box<dyn Error + Send + Sync>> {
    // Validation happens before any session mutation so a rejected request
    // leaves the store untouched.
    let message = match body
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
    {
        Some(text) => text.to_string(),
        None => {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Поле message обязательно и должно содержать текст",
                    "code": "INVALID_MESSAGE"
                }),
            ));
        }
    };

    let session_id = body
        .get("sessionId")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(new_session_id);

    tracing::info!(
        target: "vitabot::chat",
        session = %session_id,
        chars = message.chars().count(),
        "chat request"
    );

    let question_count = state.store.record_question(&session_id);
    let history = state.store.history(&session_id, state.config.max_history_turns);

    let (reply, source) = match &state.provider {
        Some(provider) => {
            let builder = PromptBuilder::new("vitahub", state.config.max_history_turns);
            let prompt = builder.render_flat(&history, &message);
            match provider
                .generate(&[Turn::user(prompt)], state.config.timeout)
                .await
            {
                Ok(text) => (text, provider.source()),
                Err(error) => {
                    tracing::warn!(
                        target: "vitabot::chat",
                        %error,
                        "model call failed, using canned reply"
                    );
                    (canned_reply(&message).to_string(), ReplySource::Local)
                }
            }
        }
        None => (canned_reply(&message).to_string(), ReplySource::Demo),
    };

    state.store.append(
        &session_id,
        vec![Turn::user(message), Turn::assistant(reply.clone())],
    );

    tracing::info!(
        target: "vitabot::chat",
        session = %session_id,
        source = source.as_str(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "reply sent"
    );

    Ok(Json(json!({
        "message": reply,
        "sessionId": session_id,
        "source": source,
        "suggestions": follow_up_suggestions(3),
        "metadata": {
            "messageCount": question_count,
            "responseTime": started.elapsed().as_millis() as u64
        }
    }))
    .into_response())
}
