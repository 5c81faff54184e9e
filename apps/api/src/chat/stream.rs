//! Chat streaming orchestrator.
//!
//! One turn = an optional structured-completion call followed by a streaming
//! text call, multiplexed into a single ordered event sequence. The
//! structured payload, when present, is always emitted before the first
//! text delta.

use std::pin::Pin;

use futures_util::{stream, Stream, StreamExt};
use tracing::{debug, warn};

use crate::chat::intent::classify_intent;
use crate::llm_client::{ChatTurn, CompletionProvider, LlmError};
use crate::models::cards::StructuredOutput;

/// One event of a chat turn. The transport layer appends the completion
/// marker; it is not an event at this level.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    StructuredData(StructuredOutput),
    MessageDelta(String),
    Error(String),
}

pub type ChatEventStream = Pin<Box<dyn Stream<Item = ChatEvent> + Send>>;

/// Runs one chat turn against the provider.
///
/// Structured-output failure is logged and swallowed — the turn still
/// streams text. Failure to establish the text stream is fatal and becomes
/// this function's `Err`, before anything has been emitted. A mid-stream
/// failure surfaces as a terminal `ChatEvent::Error`.
pub async fn stream_chat(
    provider: &dyn CompletionProvider,
    system_prompt: &str,
    message: &str,
    history: &[ChatTurn],
) -> Result<ChatEventStream, LlmError> {
    let structured = match classify_intent(message) {
        Some(intent) => {
            debug!("structured intent classified: {intent:?}");
            match provider
                .complete_structured(system_prompt, history, message)
                .await
            {
                Ok(data) => Some(data),
                Err(e) => {
                    warn!("structured output generation failed, continuing with text: {e}");
                    None
                }
            }
        }
        None => None,
    };

    let fragments = provider
        .complete_stream(system_prompt, history, message)
        .await?;

    let head = stream::iter(structured.map(ChatEvent::StructuredData));
    let tail = fragments.map(|fragment| match fragment {
        Ok(text) => ChatEvent::MessageDelta(text),
        Err(e) => ChatEvent::Error(e.to_string()),
    });

    Ok(Box::pin(head.chain(tail)))
}
