//! Chat relay service — input validation around single best-effort upstream calls.

use std::sync::Arc;

use chatrelay_client::{BoxedStream, ChatBackend, ChatPrompt, MediaPart};
use chatrelay_core::{RelayError, Result};

/// Message returned for non-image uploads, kept verbatim from the product UI.
pub const UNSUPPORTED_FILE_TYPE: &str = "不支持的文件类型，请上传图片文件";

/// Stateless relay over a chat backend. Each call is one request/response
/// (or request/stream) cycle; nothing is retried.
pub struct ChatRelay {
    backend: Arc<dyn ChatBackend>,
}

impl ChatRelay {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    /// Single-shot chat: forwards the message text unmodified.
    pub async fn chat(&self, message: &str) -> Result<String> {
        validate_message(message)?;
        self.backend.call(ChatPrompt::text(message)).await
    }

    /// Streaming chat. Dropping the returned stream cancels the upstream call.
    pub fn chat_stream(&self, message: &str) -> Result<BoxedStream> {
        validate_message(message)?;
        Ok(self.backend.stream(ChatPrompt::text(message)))
    }

    /// Chat about an uploaded image. Non-image uploads are rejected before
    /// any upstream call is made.
    pub async fn chat_with_image(
        &self,
        message: &str,
        bytes: Vec<u8>,
        content_type: &str,
        filename: &str,
    ) -> Result<String> {
        validate_message(message)?;

        if !content_type.starts_with("image/") {
            return Err(RelayError::UnsupportedMediaType(UNSUPPORTED_FILE_TYPE.into()));
        }
        if bytes.is_empty() {
            return Err(RelayError::InvalidArgument("uploaded file is empty".into()));
        }

        let media = MediaPart {
            mime_type: content_type.to_string(),
            bytes,
            filename: filename.to_string(),
        };
        self.backend
            .call(ChatPrompt::with_media(message, media))
            .await
    }
}

fn validate_message(message: &str) -> Result<()> {
    if message.trim().is_empty() {
        return Err(RelayError::InvalidArgument("message must not be empty".into()));
    }
    Ok(())
}
