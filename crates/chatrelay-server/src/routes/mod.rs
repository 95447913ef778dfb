//! HTTP route handlers.

pub mod chat;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .nest("/ai", chat::routes())
        .layer(body_limit)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
