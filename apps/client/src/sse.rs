//! SSE frame parser — reassembles `data: ...` frames from raw byte chunks.
//!
//! Chunk boundaries are arbitrary: a frame may arrive split mid-line, and a
//! chunk may carry several frames. Partial trailing lines stay buffered
//! until the next chunk. Malformed JSON payloads are logged and skipped;
//! they never abort the stream.

use serde::Deserialize;
use tracing::warn;

use crate::cards::StructuredOutput;

/// One parsed `{type, data}` envelope from the chat stream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum Envelope {
    StructuredData(StructuredOutput),
    Message(String),
    Error(ErrorPayload),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SseFrame {
    Event(Envelope),
    Done,
}

#[derive(Debug, Default)]
pub struct SseFrameParser {
    carry: String,
}

impl SseFrameParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one byte chunk and returns every frame completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.carry.push_str(&String::from_utf8_lossy(chunk));

        let mut frames = Vec::new();
        while let Some(pos) = self.carry.find('\n') {
            let line: String = self.carry.drain(..=pos).collect();
            let line = line.trim_end();

            let Some(payload) = line.strip_prefix("data: ") else {
                continue;
            };

            if payload == "[DONE]" {
                frames.push(SseFrame::Done);
                continue;
            }

            match serde_json::from_str::<Envelope>(payload) {
                Ok(envelope) => frames.push(SseFrame::Event(envelope)),
                Err(e) => warn!("Failed to parse SSE data: {e}"),
            }
        }
        frames
    }
}
