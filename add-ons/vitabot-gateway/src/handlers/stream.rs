//! Simulated token streaming (`GET /v1/chat/stream`).
//!
//! The upstream providers are called non-streaming; the finished reply is cut
//! into fixed-size chunks and replayed as SSE `data` frames followed by a
//! terminal `done` event. Failures after the stream has started are reported
//! in-band as an `error` event (or, with `BOT_STREAM_FALLBACK=true`, replaced
//! by a canned reply) because the 200 status is already on the wire.

use std::convert::Infallible;
use std::time::Duration;

use async_stream::stream;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use vitabot_core::{canned_reply, split_chunks, PromptBuilder};

use super::client_authorized;
use crate::AppState;

const STREAM_CHUNK_CHARS: usize = 200;

#[derive(Deserialize)]
pub struct StreamParams {
    #[serde(rename = "sessionId", default)]
    session_id: Option<String>,
    #[serde(rename = "companyId", default)]
    company_id: Option<String>,
    #[serde(default)]
    q: Option<String>,
}

pub async fn chat_stream(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<StreamParams>,
) -> Response {
    if !client_authorized(&headers, &state.config) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let session_id = params.session_id.unwrap_or_default();
    let question = params.q.unwrap_or_default();
    if session_id.trim().is_empty() || question.trim().is_empty() {
        // EventSource clients cannot read a JSON error body, so the 400 is
        // itself a one-frame event stream.
        return bad_request_event("sessionId and q are required");
    }

    // the /v1 surface belongs to the consultant widget, so that is the
    // default persona here
    let company_id = params
        .company_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| "consultant-it".to_string());
    let provider = state.provider.clone();
    let timeout = state.config.timeout;
    let max_history_turns = state.config.max_history_turns;
    let fallback = state.config.stream_fallback;

    let events = stream! {
        let result = match &provider {
            Some(provider) => {
                let builder = PromptBuilder::new(&company_id, max_history_turns);
                let messages = builder.build_messages(&[], &question);
                provider.generate(&messages, timeout).await
            }
            // demo mode streams the canned reply
            None => Ok(canned_reply(&question).to_string()),
        };

        match result {
            Ok(text) => {
                for chunk in split_chunks(&text, STREAM_CHUNK_CHARS) {
                    yield Ok::<_, Infallible>(
                        Event::default().data(json!({"chunk": chunk}).to_string()),
                    );
                }
                yield Ok(Event::default().event("done").data("{}"));
            }
            Err(error) => {
                tracing::warn!(
                    target: "vitabot::stream",
                    %error,
                    session = %session_id,
                    "stream generation failed"
                );
                if fallback {
                    for chunk in split_chunks(canned_reply(&question), STREAM_CHUNK_CHARS) {
                        yield Ok(Event::default().data(json!({"chunk": chunk}).to_string()));
                    }
                    yield Ok(Event::default().event("done").data("{}"));
                } else {
                    yield Ok(Event::default()
                        .event("error")
                        .data(json!({"error": error.to_string()}).to_string()));
                }
            }
        }
    };

    Sse::new(events)
        .keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(15))
                .text("keepalive"),
        )
        .into_response()
}

fn bad_request_event(message: &str) -> Response {
    Response::builder()
        .status(StatusCode::BAD_REQUEST)
        .header(header::CONTENT_TYPE, "text/event-stream; charset=utf-8")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from(format!("event: error\ndata: {message}\n\n")))
        .expect("static response must build")
}
