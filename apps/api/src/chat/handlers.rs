//! POST /api/chat — request validation and the SSE transport layer.
//!
//! Validation failures are rejected as plain JSON 400s before any streaming
//! begins. Once the event stream starts, the response status is committed;
//! later failures travel inside the stream as `error` frames.

use std::convert::Infallible;

use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures_util::{stream, StreamExt};
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::chat::stream::{stream_chat, ChatEvent};
use crate::errors::AppError;
use crate::llm_client::{ChatRole, ChatTurn};
use crate::state::AppState;

pub const MAX_MESSAGE_LENGTH: usize = 5000;
pub const MAX_HISTORY_LENGTH: usize = 50;

/// Terminal sentinel frame, sent after the event sequence ends for any
/// reason. Literal text, not JSON.
pub const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug)]
pub struct ChatRequest {
    pub message: String,
    pub history: Vec<ChatTurn>,
}

/// Validates the raw request body by hand so shape errors come back as 400s
/// with actionable messages rather than extractor rejections.
pub fn parse_chat_request(body: &Value) -> Result<ChatRequest, AppError> {
    let message = match body.get("message") {
        None | Some(Value::Null) => {
            return Err(AppError::Validation("Message is required".to_string()))
        }
        Some(Value::String(s)) => s.clone(),
        Some(_) => {
            return Err(AppError::Validation(
                "Message must be a string".to_string(),
            ))
        }
    };

    if message.is_empty() {
        return Err(AppError::Validation("Message is required".to_string()));
    }

    if message.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(AppError::Validation(format!(
            "Message is too long (max {MAX_MESSAGE_LENGTH} characters)"
        )));
    }

    let history = match body.get("conversationHistory") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => {
            if entries.len() > MAX_HISTORY_LENGTH {
                return Err(AppError::Validation(format!(
                    "Conversation history is too long (max {MAX_HISTORY_LENGTH} messages)"
                )));
            }
            entries
                .iter()
                .map(|entry| ChatTurn {
                    // Anything that is not explicitly a user turn speaks as
                    // the assistant; extra fields (ids, payloads) are ignored.
                    role: match entry.get("role").and_then(Value::as_str) {
                        Some("user") => ChatRole::User,
                        _ => ChatRole::Assistant,
                    },
                    content: entry
                        .get("content")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                })
                .collect()
        }
        Some(_) => {
            return Err(AppError::Validation(
                "Conversation history must be an array".to_string(),
            ))
        }
    };

    Ok(ChatRequest { message, history })
}

/// Serializes one orchestrator event into the `{type, data}` frame envelope.
fn event_envelope(event: &ChatEvent) -> Value {
    match event {
        ChatEvent::StructuredData(data) => json!({
            "type": "structuredData",
            "data": data,
        }),
        ChatEvent::MessageDelta(text) => json!({
            "type": "message",
            "data": text,
        }),
        ChatEvent::Error(message) => json!({
            "type": "error",
            "data": { "message": message },
        }),
    }
}

/// POST /api/chat
///
/// Streams one chat turn as SSE frames, terminated by the `[DONE]` sentinel.
/// A failure to establish the upstream text stream is returned as a plain
/// 500 — at that point nothing has been written to the response.
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Response, AppError> {
    let request = parse_chat_request(&body)?;

    let turn_id = Uuid::new_v4();
    info!(
        %turn_id,
        message_chars = request.message.chars().count(),
        history_len = request.history.len(),
        "chat turn started"
    );

    let events = stream_chat(
        state.llm.as_ref(),
        &state.system_prompt,
        &request.message,
        &request.history,
    )
    .await
    .map_err(|e| AppError::Llm(e.to_string()))?;

    let frames = events
        .map(|event| Event::default().data(event_envelope(&event).to_string()))
        .chain(stream::once(async move {
            debug!(%turn_id, "chat turn stream complete");
            Event::default().data(DONE_SENTINEL)
        }))
        .map(Ok::<_, Infallible>);

    let mut response = Sse::new(frames).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-transform"),
    );
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    // Disable buffering in nginx
    headers.insert("x-accel-buffering", HeaderValue::from_static("no"));

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    use crate::llm_client::stub::StubProvider;
    use crate::models::cards::{SkillCard, StructuredOutput};
    use crate::state::AppState;

    // ── Request validation ──────────────────────────────────────────────────

    #[test]
    fn test_missing_message_is_rejected() {
        let err = parse_chat_request(&json!({})).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("required"));
    }

    #[test]
    fn test_non_string_message_is_rejected() {
        let err = parse_chat_request(&json!({ "message": 42 })).unwrap_err();
        assert!(err.to_string().contains("string"));

        let err = parse_chat_request(&json!({ "message": ["hi"] })).unwrap_err();
        assert!(err.to_string().contains("string"));
    }

    #[test]
    fn test_empty_message_is_rejected() {
        let err = parse_chat_request(&json!({ "message": "" })).unwrap_err();
        assert!(err.to_string().contains("required"));
    }

    #[test]
    fn test_oversized_message_is_rejected_with_length_error() {
        let long = "a".repeat(MAX_MESSAGE_LENGTH + 1);
        let err = parse_chat_request(&json!({ "message": long })).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("too long"));
        assert!(err.to_string().contains("5000"));
    }

    #[test]
    fn test_message_at_the_limit_is_accepted() {
        let exact = "a".repeat(MAX_MESSAGE_LENGTH);
        let request = parse_chat_request(&json!({ "message": exact })).unwrap();
        assert_eq!(request.message.len(), MAX_MESSAGE_LENGTH);
    }

    #[test]
    fn test_oversized_history_is_rejected_with_length_error() {
        let history: Vec<Value> = (0..MAX_HISTORY_LENGTH + 1)
            .map(|i| json!({ "role": "user", "content": format!("msg {i}") }))
            .collect();
        let err = parse_chat_request(&json!({
            "message": "hi",
            "conversationHistory": history,
        }))
        .unwrap_err();
        assert!(err.to_string().contains("too long"));
        assert!(err.to_string().contains("50"));
    }

    #[test]
    fn test_non_array_history_is_rejected() {
        let err = parse_chat_request(&json!({
            "message": "hi",
            "conversationHistory": "not an array",
        }))
        .unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_history_roles_map_and_extra_fields_are_ignored() {
        let request = parse_chat_request(&json!({
            "message": "hi",
            "conversationHistory": [
                { "role": "user", "content": "q", "id": "1" },
                { "role": "assistant", "content": "a", "structuredData": { "type": "info" } },
                { "role": "something-else", "content": "x" },
            ],
        }))
        .unwrap();

        assert_eq!(request.history.len(), 3);
        assert_eq!(request.history[0].role, ChatRole::User);
        assert_eq!(request.history[1].role, ChatRole::Assistant);
        assert_eq!(request.history[2].role, ChatRole::Assistant);
        assert_eq!(request.history[0].content, "q");
    }

    #[test]
    fn test_absent_history_defaults_to_empty() {
        let request = parse_chat_request(&json!({ "message": "hi" })).unwrap();
        assert!(request.history.is_empty());
    }

    // ── Frame envelopes ─────────────────────────────────────────────────────

    #[test]
    fn test_structured_data_envelope_shape() {
        let event = ChatEvent::StructuredData(StructuredOutput::Skill(SkillCard {
            category: "Backend".to_string(),
            skills: vec!["Rust".to_string()],
        }));
        let envelope = event_envelope(&event);
        assert_eq!(envelope["type"], "structuredData");
        assert_eq!(envelope["data"]["type"], "skill");
        assert_eq!(envelope["data"]["category"], "Backend");
    }

    #[test]
    fn test_message_envelope_carries_raw_delta() {
        let envelope = event_envelope(&ChatEvent::MessageDelta("Hel".to_string()));
        assert_eq!(envelope["type"], "message");
        assert_eq!(envelope["data"], "Hel");
    }

    #[test]
    fn test_error_envelope_wraps_message() {
        let envelope = event_envelope(&ChatEvent::Error("boom".to_string()));
        assert_eq!(envelope["type"], "error");
        assert_eq!(envelope["data"]["message"], "boom");
    }

    // ── Full handler ────────────────────────────────────────────────────────

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_handler_rejects_invalid_body_with_400() {
        let state = AppState::for_tests(StubProvider::default());
        let response = handle_chat(State(state), Json(json!({})))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_handler_returns_500_when_stream_cannot_start() {
        let state = AppState::for_tests(StubProvider {
            fail_stream_init: true,
            ..Default::default()
        });
        let response = handle_chat(State(state), Json(json!({ "message": "hi" })))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_handler_streams_frames_and_done_sentinel() {
        let state = AppState::for_tests(StubProvider {
            structured: Some(StructuredOutput::Skill(SkillCard {
                category: "Backend".to_string(),
                skills: vec!["Rust".to_string()],
            })),
            fragments: vec!["I ".to_string(), "build".to_string()],
            ..Default::default()
        });

        let response = handle_chat(
            State(state),
            Json(json!({ "message": "show me a project" })),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap(),
            "text/event-stream"
        );
        assert_eq!(
            response.headers().get("x-accel-buffering").unwrap(),
            "no"
        );

        let body = body_text(response).await;
        let structured_at = body.find(r#""type":"structuredData""#).unwrap();
        let first_delta_at = body.find(r#""type":"message""#).unwrap();
        assert!(structured_at < first_delta_at);
        assert!(body.ends_with("data: [DONE]\n\n"));
    }

    #[tokio::test]
    async fn test_mid_stream_failure_emits_error_frame_then_done() {
        let state = AppState::for_tests(StubProvider {
            fragments: vec!["partial".to_string()],
            mid_stream_error: Some("upstream reset".to_string()),
            ..Default::default()
        });

        let response = handle_chat(State(state), Json(json!({ "message": "hi" })))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_text(response).await;
        let error_at = body.find(r#""type":"error""#).unwrap();
        let done_at = body.find("data: [DONE]").unwrap();
        assert!(error_at < done_at);
        assert!(body.contains("upstream reset"));
    }
}
