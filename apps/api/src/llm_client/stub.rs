//! Scripted `CompletionProvider` for tests. Counts calls so tests can assert
//! which upstream shapes were (and were not) exercised.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures_util::stream;

use crate::llm_client::{ChatTurn, CompletionProvider, LlmError, TextFragmentStream};
use crate::models::cards::StructuredOutput;

pub struct StubProvider {
    /// Returned by `complete`.
    pub message: String,
    /// `Some` → returned by `complete_structured`; `None` → it fails.
    pub structured: Option<StructuredOutput>,
    /// Panic instead of answering a structured call. For tests asserting
    /// that static data short-circuits the LLM.
    pub panic_on_structured: bool,
    /// Fragments yielded by `complete_stream`.
    pub fragments: Vec<String>,
    /// `complete_stream` returns `Err` instead of a stream.
    pub fail_stream_init: bool,
    /// Yielded as a final `Err` after the fragments.
    pub mid_stream_error: Option<String>,

    pub complete_calls: AtomicUsize,
    pub structured_calls: AtomicUsize,
    pub stream_calls: AtomicUsize,
}

impl Default for StubProvider {
    fn default() -> Self {
        Self {
            message: "stub message".to_string(),
            structured: None,
            panic_on_structured: false,
            fragments: Vec::new(),
            fail_stream_init: false,
            mid_stream_error: None,
            complete_calls: AtomicUsize::new(0),
            structured_calls: AtomicUsize::new(0),
            stream_calls: AtomicUsize::new(0),
        }
    }
}

fn stub_api_error(message: &str) -> LlmError {
    LlmError::Api {
        status: 500,
        message: message.to_string(),
    }
}

#[async_trait]
impl CompletionProvider for StubProvider {
    async fn complete(
        &self,
        _system: &str,
        _history: &[ChatTurn],
        _input: &str,
    ) -> Result<String, LlmError> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.message.clone())
    }

    async fn complete_structured(
        &self,
        _system: &str,
        _history: &[ChatTurn],
        _input: &str,
    ) -> Result<StructuredOutput, LlmError> {
        if self.panic_on_structured {
            panic!("complete_structured called, but static data should have been used");
        }
        self.structured_calls.fetch_add(1, Ordering::SeqCst);
        self.structured
            .clone()
            .ok_or_else(|| stub_api_error("structured output unavailable"))
    }

    async fn complete_stream(
        &self,
        _system: &str,
        _history: &[ChatTurn],
        _input: &str,
    ) -> Result<TextFragmentStream, LlmError> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_stream_init {
            return Err(stub_api_error("stream could not be established"));
        }

        let mut items: Vec<Result<String, LlmError>> =
            self.fragments.iter().cloned().map(Ok).collect();
        if let Some(message) = &self.mid_stream_error {
            items.push(Err(stub_api_error(message)));
        }

        Ok(Box::pin(stream::iter(items)))
    }
}
