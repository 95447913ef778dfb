//! Prompt and response types shared between the adapter and the server.

use serde::{Deserialize, Serialize};

/// A single binary attachment accompanying a text prompt.
#[derive(Debug, Clone)]
pub struct MediaPart {
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub filename: String,
}

/// Provider-agnostic chat request: text plus at most one media part.
#[derive(Debug, Clone)]
pub struct ChatPrompt {
    pub text: String,
    pub media: Option<MediaPart>,
}

impl ChatPrompt {
    /// Text-only prompt.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            media: None,
        }
    }

    /// Prompt carrying an image attachment.
    pub fn with_media(text: impl Into<String>, media: MediaPart) -> Self {
        Self {
            text: text.into(),
            media: Some(media),
        }
    }
}

/// A single streamed token or terminal signal.
pub enum StreamChunk {
    Token(String),
    Done { tokens_used: usize },
    Error(String),
}

/// Single-shot response body: `{"generation": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generation {
    pub generation: String,
}

/// SSE event types emitted on the streaming endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum StreamEvent {
    #[serde(rename = "token")]
    Token { content: String },
    #[serde(rename = "done")]
    Done {
        model: String,
        #[serde(rename = "tokensUsed")]
        tokens_used: usize,
        duration: u64,
    },
    #[serde(rename = "error")]
    Error { error: String },
}
