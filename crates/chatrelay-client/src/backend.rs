//! Chat backend trait — the seam between the relay and the provider client.

use std::pin::Pin;

use futures::future::BoxFuture;
use futures::Stream;

use chatrelay_core::Result;

use crate::types::{ChatPrompt, StreamChunk};

/// Boxed stream type for returning different stream implementations.
pub type BoxedStream = Pin<Box<dyn Stream<Item = StreamChunk> + Send>>;

/// A chat-completion backend.
///
/// Implementations make exactly one upstream attempt per invocation; retries
/// are the caller's concern (and the relay does none). Dropping the stream
/// returned by [`ChatBackend::stream`] must close the upstream connection.
pub trait ChatBackend: Send + Sync {
    /// Single-shot completion: returns the full generated text.
    fn call(&self, prompt: ChatPrompt) -> BoxFuture<'static, Result<String>>;

    /// Streaming completion: yields tokens as the provider emits them.
    fn stream(&self, prompt: ChatPrompt) -> BoxedStream;
}
