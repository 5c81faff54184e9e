//! Chat session state machine.
//!
//! One send at a time: the user message is appended optimistically and never
//! rolled back; the assistant placeholder exists only while its turn is
//! alive and is removed if the turn fails. Aborting is not a failure —
//! content already applied stays, and no error is recorded.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{FutureExt, StreamExt};
use tokio::sync::Notify;
use tracing::{debug, warn};

use crate::cards::CardResponse;
use crate::messages::{ChatMessage, Role};
use crate::sse::{Envelope, SseFrame, SseFrameParser};
use crate::transport::{ChatTransport, HistoryEntry, TransportError};

/// Inserted between delta applications to keep the perceived typing speed
/// readable. Presentation only; zero is valid.
pub const DEFAULT_DELTA_DELAY: Duration = Duration::from_millis(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Sending,
    Streaming,
}

/// How a `send_message` call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Completed,
    Aborted,
    /// Nothing was sent: blank input or a send already in flight.
    Ignored,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("chat turn failed: {0}")]
    Turn(String),
}

/// Aborts the session's in-flight turn from another task.
#[derive(Clone)]
pub struct AbortHandle(Arc<Notify>);

impl AbortHandle {
    pub fn abort(&self) {
        self.0.notify_one();
    }
}

pub struct ChatSession {
    transport: Arc<dyn ChatTransport>,
    messages: Vec<ChatMessage>,
    phase: SessionPhase,
    last_error: Option<String>,
    delta_delay: Duration,
    abort: Arc<Notify>,
}

impl ChatSession {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            transport,
            messages: Vec::new(),
            phase: SessionPhase::Idle,
            last_error: None,
            delta_delay: DEFAULT_DELTA_DELAY,
            abort: Arc::new(Notify::new()),
        }
    }

    pub fn with_delta_delay(mut self, delay: Duration) -> Self {
        self.delta_delay = delay;
        self
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase != SessionPhase::Idle
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle(self.abort.clone())
    }

    /// Empties the message list and error state. Does NOT abort an in-flight
    /// turn: a turn completing after a clear appends to the emptied list.
    pub fn clear_messages(&mut self) {
        self.messages.clear();
        self.last_error = None;
    }

    /// Appends an assistant message carrying a card fetched from a card
    /// endpoint.
    pub fn add_card_message(&mut self, card: CardResponse) {
        let mut message = ChatMessage::assistant_placeholder();
        message.content = card.message;
        message.structured_data = Some(card.structured_data);
        message.projects = card.projects.unwrap_or_default();
        self.messages.push(message);
    }

    /// Sends one chat turn, applying streamed frames to the message list as
    /// they arrive. `on_delta` fires for each applied text delta.
    pub async fn send_message(
        &mut self,
        text: &str,
        mut on_delta: impl FnMut(&str),
    ) -> Result<SendOutcome, SessionError> {
        if text.trim().is_empty() {
            return Ok(SendOutcome::Ignored);
        }
        if self.phase != SessionPhase::Idle {
            warn!("send_message called while a turn is in flight; ignoring");
            return Ok(SendOutcome::Ignored);
        }

        // Drop any abort signal left over from before this turn started.
        let _ = self.abort.notified().now_or_never();

        // History excludes the message being sent.
        let history: Vec<HistoryEntry> = self
            .messages
            .iter()
            .map(|m| HistoryEntry {
                role: m.role.as_str().to_string(),
                content: m.content.clone(),
            })
            .collect();

        self.messages.push(ChatMessage::user(text));
        self.phase = SessionPhase::Sending;
        self.last_error = None;

        let mut stream = match self.transport.stream_chat(text, &history).await {
            Ok(stream) => stream,
            Err(e) => {
                // The turn never started; there is no placeholder to remove.
                self.phase = SessionPhase::Idle;
                self.last_error = Some(e.to_string());
                return Err(e.into());
            }
        };

        self.messages.push(ChatMessage::assistant_placeholder());
        self.phase = SessionPhase::Streaming;

        let mut parser = SseFrameParser::new();
        let abort = self.abort.clone();

        loop {
            let chunk = tokio::select! {
                _ = abort.notified() => {
                    debug!("turn aborted; keeping applied content");
                    self.phase = SessionPhase::Idle;
                    return Ok(SendOutcome::Aborted);
                }
                chunk = stream.next() => chunk,
            };

            let Some(chunk) = chunk else {
                // Stream ended without an explicit [DONE]; the turn is over.
                break;
            };

            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    self.fail_turn(e.to_string());
                    return Err(e.into());
                }
            };

            for frame in parser.push(&chunk) {
                match frame {
                    SseFrame::Done => {
                        self.phase = SessionPhase::Idle;
                        return Ok(SendOutcome::Completed);
                    }
                    SseFrame::Event(Envelope::StructuredData(data)) => {
                        // Later arrivals overwrite.
                        if let Some(message) = self.last_assistant_mut() {
                            message.structured_data = Some(data);
                        }
                    }
                    SseFrame::Event(Envelope::Message(delta)) => {
                        if let Some(message) = self.last_assistant_mut() {
                            message.content.push_str(&delta);
                        }
                        on_delta(&delta);
                        if !self.delta_delay.is_zero() {
                            tokio::time::sleep(self.delta_delay).await;
                        }
                    }
                    SseFrame::Event(Envelope::Error(error)) => {
                        self.fail_turn(error.message.clone());
                        return Err(SessionError::Turn(error.message));
                    }
                }
            }
        }

        self.phase = SessionPhase::Idle;
        Ok(SendOutcome::Completed)
    }

    fn last_assistant_mut(&mut self) -> Option<&mut ChatMessage> {
        self.messages
            .last_mut()
            .filter(|m| m.role == Role::Assistant)
    }

    /// Failure path: the partial turn is discarded, not left dangling.
    fn fail_turn(&mut self, reason: String) {
        if self
            .messages
            .last()
            .map(|m| m.role == Role::Assistant)
            .unwrap_or(false)
        {
            self.messages.pop();
        }
        self.phase = SessionPhase::Idle;
        self.last_error = Some(reason);
    }
}
