//! ChatRelay — HTTP gateway forwarding chat (and images) to an LLM provider.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod relay;
mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let data_dir = chatrelay_core::config::resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    // Initialize configuration
    let config = chatrelay_core::RelayConfig::from_env(&data_dir)?;
    let port = config.port;

    let llm = chatrelay_client::LlmConfig::load(&config.data_paths.llm_config_file);
    if !llm.is_configured() {
        warn!("No LLM API key configured; upstream calls will fail");
    }

    // Build the upstream client and application state
    let backend = Arc::new(chatrelay_client::HttpChatClient::new(&llm)?);
    let state = Arc::new(AppState::new(config, llm, backend));

    // Build router
    let app = routes::build_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("ChatRelay listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
