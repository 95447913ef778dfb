//! Shared application state.

use std::sync::Arc;

use chatrelay_client::{ChatBackend, LlmConfig};
use chatrelay_core::RelayConfig;

use crate::relay::ChatRelay;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: RelayConfig,
    pub llm: LlmConfig,
    pub relay: ChatRelay,
}

impl AppState {
    pub fn new(config: RelayConfig, llm: LlmConfig, backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            config,
            llm,
            relay: ChatRelay::new(backend),
        }
    }
}
