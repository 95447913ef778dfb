//! OpenAI-compatible chat-completion client.
//!
//! One implementation covers every endpoint speaking the OpenAI wire shape
//! (DeepSeek, DashScope, OpenAI): a single-shot POST and an SSE stream.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use futures::future::BoxFuture;
use futures::Stream;
use reqwest::Client;
use serde_json::json;
use tokio_stream::StreamExt;
use tracing::debug;

use chatrelay_core::{RelayError, Result};

use crate::backend::{BoxedStream, ChatBackend};
use crate::config::LlmConfig;
use crate::types::{ChatPrompt, MediaPart, StreamChunk};

/// Chat backend talking to an OpenAI-compatible HTTP endpoint.
pub struct HttpChatClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    vision_model: String,
    temperature: f64,
    max_tokens: usize,
    call_timeout: Duration,
}

impl HttpChatClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| RelayError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().unwrap_or_default(),
            model: config.model.clone(),
            vision_model: config.vision_model().to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            call_timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Vision model for image prompts, text model otherwise.
    fn model_for(&self, prompt: &ChatPrompt) -> &str {
        if prompt.media.is_some() {
            &self.vision_model
        } else {
            &self.model
        }
    }
}

impl ChatBackend for HttpChatClient {
    fn call(&self, prompt: ChatPrompt) -> BoxFuture<'static, Result<String>> {
        let client = self.client.clone();
        let url = self.completions_url();
        let api_key = self.api_key.clone();
        let model = self.model_for(&prompt).to_string();
        let body = completion_body(&model, self.temperature, self.max_tokens, &prompt, false);
        let timeout = self.call_timeout;

        Box::pin(async move {
            debug!("Calling {} with model {}", url, model);

            let response = client
                .post(&url)
                .timeout(timeout)
                .header("Authorization", format!("Bearer {}", api_key))
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await
                .map_err(|e| RelayError::Upstream(format!("Request failed: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(RelayError::Upstream(format!("API error {}: {}", status, body)));
            }

            let parsed: serde_json::Value = response
                .json()
                .await
                .map_err(|e| RelayError::Upstream(format!("Malformed response: {}", e)))?;

            parsed["choices"][0]["message"]["content"]
                .as_str()
                .map(|s| s.to_string())
                .ok_or_else(|| RelayError::Upstream("Response carried no message content".into()))
        })
    }

    fn stream(&self, prompt: ChatPrompt) -> BoxedStream {
        let model = self.model_for(&prompt).to_string();
        let body = completion_body(&model, self.temperature, self.max_tokens, &prompt, true);
        Box::pin(stream_openai_compat(
            self.client.clone(),
            self.completions_url(),
            self.api_key.clone(),
            model,
            body,
        ))
    }
}

/// Stream tokens from an OpenAI-compatible SSE response.
///
/// Dropping the returned stream drops the in-flight response and closes the
/// upstream connection.
fn stream_openai_compat(
    client: Client,
    url: String,
    api_key: String,
    model: String,
    body: serde_json::Value,
) -> impl Stream<Item = StreamChunk> + Send + 'static {
    async_stream::stream! {
        debug!("Streaming from {} with model {}", url, model);

        let response = match client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                yield StreamChunk::Error(format!("Request failed: {}", e));
                return;
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            yield StreamChunk::Error(format!("API error {}: {}", status, body));
            return;
        }

        let mut stream = response.bytes_stream();
        let mut buffer = String::new();
        let mut token_count = 0usize;

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    yield StreamChunk::Error(format!("Stream read error: {}", e));
                    return;
                }
            };

            buffer.push_str(&String::from_utf8_lossy(&bytes));

            // Process complete SSE lines
            while let Some(line_end) = buffer.find('\n') {
                let line = buffer[..line_end].trim().to_string();
                buffer = buffer[line_end + 1..].to_string();

                match parse_sse_line(&line) {
                    SseFrame::Skip => {}
                    SseFrame::Token(content) => {
                        token_count += 1;
                        yield StreamChunk::Token(content);
                    }
                    SseFrame::Done => {
                        yield StreamChunk::Done { tokens_used: token_count };
                        return;
                    }
                }
            }
        }

        yield StreamChunk::Done { tokens_used: token_count };
    }
}

/// One parsed SSE line.
#[derive(Debug, PartialEq, Eq)]
enum SseFrame {
    /// Blank line, comment, non-data field, or empty delta.
    Skip,
    Token(String),
    Done,
}

fn parse_sse_line(line: &str) -> SseFrame {
    if line.is_empty() || line.starts_with(':') {
        return SseFrame::Skip;
    }
    let Some(data) = line.strip_prefix("data: ") else {
        return SseFrame::Skip;
    };
    if data.trim() == "[DONE]" {
        return SseFrame::Done;
    }
    match serde_json::from_str::<serde_json::Value>(data) {
        Ok(parsed) => match parsed["choices"][0]["delta"]["content"].as_str() {
            Some(content) if !content.is_empty() => SseFrame::Token(content.to_string()),
            _ => SseFrame::Skip,
        },
        Err(_) => SseFrame::Skip,
    }
}

/// Build the chat-completion request body. Image prompts become a two-part
/// user message with a base64 data-URL image part.
fn completion_body(
    model: &str,
    temperature: f64,
    max_tokens: usize,
    prompt: &ChatPrompt,
    stream: bool,
) -> serde_json::Value {
    let content = match &prompt.media {
        None => json!(prompt.text),
        Some(media) => json!([
            {"type": "text", "text": prompt.text},
            {"type": "image_url", "image_url": {"url": data_url(media)}},
        ]),
    };

    json!({
        "model": model,
        "messages": [{"role": "user", "content": content}],
        "temperature": temperature,
        "max_tokens": max_tokens,
        "stream": stream,
    })
}

fn data_url(media: &MediaPart) -> String {
    format!(
        "data:{};base64,{}",
        media.mime_type,
        BASE64.encode(&media.bytes)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sse_token_lines_parse() {
        let line = r#"data: {"choices":[{"delta":{"content":"Hi"}}]}"#;
        assert_eq!(parse_sse_line(line), SseFrame::Token("Hi".into()));
    }

    #[test]
    fn sse_done_marker_parses() {
        assert_eq!(parse_sse_line("data: [DONE]"), SseFrame::Done);
    }

    #[test]
    fn sse_noise_is_skipped() {
        assert_eq!(parse_sse_line(""), SseFrame::Skip);
        assert_eq!(parse_sse_line(": keep-alive"), SseFrame::Skip);
        assert_eq!(parse_sse_line("event: message"), SseFrame::Skip);
        // Role-only delta carries no content
        let line = r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#;
        assert_eq!(parse_sse_line(line), SseFrame::Skip);
        assert_eq!(parse_sse_line("data: not-json"), SseFrame::Skip);
    }

    #[test]
    fn text_prompt_body_is_plain_string_content() {
        let prompt = ChatPrompt::text("Hello");
        let body = completion_body("deepseek-chat", 0.7, 2048, &prompt, false);

        assert_eq!(body["model"], "deepseek-chat");
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Hello");
    }

    #[test]
    fn image_prompt_body_carries_data_url_part() {
        let media = MediaPart {
            mime_type: "image/png".into(),
            bytes: vec![1, 2, 3],
            filename: "t.png".into(),
        };
        let prompt = ChatPrompt::with_media("What is this?", media);
        let body = completion_body("qwen-vl-plus", 0.7, 2048, &prompt, true);

        assert_eq!(body["stream"], true);
        let parts = body["messages"][0]["content"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[0]["text"], "What is this?");
        assert_eq!(parts[1]["type"], "image_url");
        let url = parts[1]["image_url"]["url"].as_str().unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn vision_model_selected_for_image_prompts() {
        let config = LlmConfig {
            api_key: Some("sk-test".into()),
            vision_model: Some("qwen-vl-plus".into()),
            ..Default::default()
        };
        let client = HttpChatClient::new(&config).unwrap();

        let text_prompt = ChatPrompt::text("hi");
        let image_prompt = ChatPrompt::with_media(
            "hi",
            MediaPart {
                mime_type: "image/jpeg".into(),
                bytes: vec![0xFF],
                filename: "a.jpg".into(),
            },
        );

        assert_eq!(client.model_for(&text_prompt), "deepseek-chat");
        assert_eq!(client.model_for(&image_prompt), "qwen-vl-plus");
    }
}
