//! Backend access behind a trait so the session state machine is testable
//! against scripted streams.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::cards::CardResponse;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned status {status}")]
    Status { status: u16 },

    #[error("stream error: {0}")]
    Stream(String),
}

/// One prior turn, in the shape `POST /api/chat` expects.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub role: String,
    pub content: String,
}

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Starts one chat turn. `Err` means the turn never began streaming.
    async fn stream_chat(
        &self,
        message: &str,
        history: &[HistoryEntry],
    ) -> Result<ByteStream, TransportError>;

    async fn fetch_card(&self, category: &str) -> Result<CardResponse, TransportError>;

    async fn fetch_personal(&self) -> Result<Value, TransportError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn stream_chat(
        &self,
        message: &str,
        history: &[HistoryEntry],
    ) -> Result<ByteStream, TransportError> {
        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&json!({
                "message": message,
                "conversationHistory": history,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        Ok(Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(TransportError::Http)),
        ))
    }

    async fn fetch_card(&self, category: &str) -> Result<CardResponse, TransportError> {
        let response = self
            .client
            .get(format!("{}/api/cards/{category}", self.base_url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response.json::<CardResponse>().await?)
    }

    async fn fetch_personal(&self) -> Result<Value, TransportError> {
        let response = self
            .client
            .get(format!("{}/api/personal", self.base_url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response.json::<Value>().await?)
    }
}
