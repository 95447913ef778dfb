//! Chat client adapter for OpenAI-compatible chat-completion APIs.
//!
//! Provides a single-shot `call` and an SSE-parsed `stream` behind the
//! `ChatBackend` trait. Image prompts ride along as base64 data-URL parts.

pub mod backend;
pub mod config;
pub mod providers;
pub mod types;

pub use backend::{BoxedStream, ChatBackend};
pub use config::LlmConfig;
pub use providers::HttpChatClient;
pub use types::*;
