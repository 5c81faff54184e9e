/// LLM Client — the single point of entry for all Claude API calls in Folio.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// All LLM interactions MUST go through this module.
///
/// Model: claude-sonnet-4-5 (hardcoded — do not make configurable to prevent drift)
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

use crate::models::cards::StructuredOutput;

pub mod prompts;
#[cfg(test)]
pub mod stub;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls in Folio.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;
/// Non-zero so the voice varies between turns; factual fields come from the
/// portfolio document, not from sampling.
const TEMPERATURE: f32 = 0.7;
/// Bound on the two non-streaming call shapes. The streaming body carries no
/// overall deadline; the connect timeout still bounds a dead upstream.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// One prior turn of the conversation, as supplied by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    fn as_str(self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// A lazy sequence of text fragments from a streaming completion.
/// Yields at most one `Err`, after which the stream ends.
pub type TextFragmentStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

/// The completion provider seam. Implement this to swap the upstream model
/// without touching the orchestrator, resolver, or handler code.
///
/// Carried in `AppState` as `Arc<dyn CompletionProvider>`.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// One-shot text completion.
    async fn complete(
        &self,
        system: &str,
        history: &[ChatTurn],
        input: &str,
    ) -> Result<String, LlmError>;

    /// One-shot completion constrained to the structured-output schema.
    async fn complete_structured(
        &self,
        system: &str,
        history: &[ChatTurn],
        input: &str,
    ) -> Result<StructuredOutput, LlmError>;

    /// Streaming text completion. Returns `Err` if the upstream call cannot
    /// be established; afterwards, failures arrive inside the stream.
    async fn complete_stream(
        &self,
        system: &str,
        history: &[ChatTurn],
        input: &str,
    ) -> Result<TextFragmentStream, LlmError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: &'static str,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct StreamEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    delta: Option<StreamDelta>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    text: Option<String>,
}

/// The single LLM client used by all services in Folio.
/// Wraps the Anthropic Messages API. One attempt per call — failures
/// propagate to the caller, there is no retry loop.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .connect_timeout(CONNECT_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    fn build_messages(history: &[ChatTurn], input: &str) -> Vec<AnthropicMessage> {
        let mut messages: Vec<AnthropicMessage> = history
            .iter()
            .map(|turn| AnthropicMessage {
                role: turn.role.as_str(),
                content: turn.content.clone(),
            })
            .collect();
        messages.push(AnthropicMessage {
            role: "user",
            content: input.to_string(),
        });
        messages
    }

    /// Makes a raw call to the Claude API, returning the full response object.
    pub async fn call(
        &self,
        system: &str,
        history: &[ChatTurn],
        input: &str,
    ) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            system: system.to_string(),
            messages: Self::build_messages(history, input),
            stream: false,
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .timeout(REQUEST_TIMEOUT)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Try to parse error message
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}",
            llm_response.usage.input_tokens, llm_response.usage.output_tokens
        );

        Ok(llm_response)
    }

    /// Convenience method that calls the LLM and deserializes the text response as JSON.
    /// The prompt must instruct the model to return valid JSON.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        system: &str,
        history: &[ChatTurn],
        input: &str,
    ) -> Result<T, LlmError> {
        let response = self.call(system, history, input).await?;

        let text = response.text().ok_or(LlmError::EmptyContent)?;

        // Strip markdown code fences if the model wraps JSON in them
        let text = strip_json_fences(text);

        serde_json::from_str(text).map_err(LlmError::Parse)
    }

    /// Issues a streaming request and forwards `content_block_delta` text
    /// fragments as they arrive. Upstream SSE lines are reassembled across
    /// chunk boundaries before parsing.
    pub async fn call_stream(
        &self,
        system: &str,
        history: &[ChatTurn],
        input: &str,
    ) -> Result<TextFragmentStream, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            system: system.to_string(),
            messages: Self::build_messages(history, input),
            stream: true,
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let (tx, rx) = tokio::sync::mpsc::channel::<Result<String, LlmError>>(32);

        tokio::spawn(async move {
            let mut bytes = response.bytes_stream();
            let mut carry = String::new();

            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        let _ = tx.send(Err(LlmError::Http(e))).await;
                        return;
                    }
                };

                carry.push_str(&String::from_utf8_lossy(&chunk));

                // Drain complete lines; a partial tail stays in the carry
                // buffer until the next chunk.
                while let Some(pos) = carry.find('\n') {
                    let line: String = carry.drain(..=pos).collect();
                    let line = line.trim_end();
                    let Some(payload) = line.strip_prefix("data: ") else {
                        continue;
                    };
                    let Ok(event) = serde_json::from_str::<StreamEvent>(payload) else {
                        continue;
                    };
                    if event.event_type != "content_block_delta" {
                        continue;
                    }
                    if let Some(text) = event.delta.and_then(|d| d.text) {
                        if tx.send(Ok(text)).await.is_err() {
                            // Receiver dropped; stop reading the upstream body.
                            return;
                        }
                    }
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

#[async_trait]
impl CompletionProvider for LlmClient {
    async fn complete(
        &self,
        system: &str,
        history: &[ChatTurn],
        input: &str,
    ) -> Result<String, LlmError> {
        let response = self.call(system, history, input).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }

    async fn complete_structured(
        &self,
        system: &str,
        history: &[ChatTurn],
        input: &str,
    ) -> Result<StructuredOutput, LlmError> {
        let system = format!("{system}\n\n{}", prompts::STRUCTURED_OUTPUT_SYSTEM);
        self.call_json::<StructuredOutput>(&system, history, input)
            .await
    }

    async fn complete_stream(
        &self,
        system: &str,
        history: &[ChatTurn],
        input: &str,
    ) -> Result<TextFragmentStream, LlmError> {
        self.call_stream(system, history, input).await
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
