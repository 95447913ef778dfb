//! Chat relay routes — the /ai/* endpoint surface.

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::Stream;
use serde::Deserialize;
use tokio_stream::StreamExt;
use tracing::error;

use chatrelay_client::{Generation, StreamChunk, StreamEvent};
use chatrelay_core::RelayError;

use crate::state::AppState;

type SseStream = Pin<Box<dyn Stream<Item = Result<Event, Infallible>> + Send>>;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat", get(chat))
        .route("/chatFlux", get(chat_flux))
        .route("/chatVQALocal", get(chat_vqa_local))
        // Two historical spellings of the same upload endpoint
        .route("/chatVQA", post(chat_vqa))
        .route("/image", post(chat_vqa))
        .route("/status", get(get_status))
}

#[derive(Debug, Deserialize)]
struct ChatParams {
    message: String,
}

// ---------------------------------------------------------------
// Non-streaming chat
// ---------------------------------------------------------------

/// GET /ai/chat — single aggregated answer.
async fn chat(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ChatParams>,
) -> Response {
    match state.relay.chat(&params.message).await {
        Ok(generation) => Json(Generation { generation }).into_response(),
        Err(e) => error_response(e),
    }
}

// ---------------------------------------------------------------
// Streaming chat (SSE)
// ---------------------------------------------------------------

/// GET /ai/chatFlux — answer streamed as server-sent events.
async fn chat_flux(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ChatParams>,
) -> Response {
    let start = Instant::now();
    let model = state.llm.model.clone();

    let mut llm_stream = match state.relay.chat_stream(&params.message) {
        Ok(stream) => stream,
        Err(e) => return error_response(e),
    };

    let sse_stream: SseStream = Box::pin(async_stream::stream! {
        while let Some(chunk) = llm_stream.next().await {
            match chunk {
                StreamChunk::Token(text) => {
                    let event = StreamEvent::Token { content: text };
                    yield Ok::<_, Infallible>(Event::default().data(
                        serde_json::to_string(&event).unwrap()
                    ));
                }
                StreamChunk::Done { tokens_used } => {
                    let event = StreamEvent::Done {
                        model: model.clone(),
                        tokens_used,
                        duration: start.elapsed().as_millis() as u64,
                    };
                    yield Ok(Event::default().data(
                        serde_json::to_string(&event).unwrap()
                    ));
                    // Final [DONE] marker
                    yield Ok(Event::default().data("[DONE]".to_string()));
                    return;
                }
                StreamChunk::Error(e) => {
                    let event = StreamEvent::Error { error: e };
                    yield Ok(Event::default().data(
                        serde_json::to_string(&event).unwrap()
                    ));
                    return;
                }
            }
        }
    });

    Sse::new(sse_stream).into_response()
}

// ---------------------------------------------------------------
// Visual question answering
// ---------------------------------------------------------------

/// GET /ai/chatVQALocal — chat about the bundled sample image.
async fn chat_vqa_local(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ChatParams>,
) -> Response {
    let image_path = &state.config.data_paths.sample_image;
    let bytes = match tokio::fs::read(image_path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to read sample image {}: {}", image_path.display(), e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": format!("读取图片文件失败: {}", e) })),
            )
                .into_response();
        }
    };

    match state
        .relay
        .chat_with_image(&params.message, bytes, "image/jpeg", "test-image.jpg")
        .await
    {
        Ok(generation) => Json(Generation { generation }).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /ai/chatVQA and /ai/image — chat about an uploaded image (multipart).
async fn chat_vqa(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let mut message: Option<String> = None;
    let mut file: Option<(Vec<u8>, String, String)> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("message") => match field.text().await {
                Ok(text) => message = Some(text),
                Err(e) => {
                    return error_response(RelayError::InvalidArgument(format!(
                        "Failed to read message field: {}",
                        e
                    )));
                }
            },
            Some("file") => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let filename = field.file_name().unwrap_or("upload").to_string();
                match field.bytes().await {
                    Ok(bytes) => file = Some((bytes.to_vec(), content_type, filename)),
                    Err(e) => {
                        return error_response(RelayError::InvalidArgument(format!(
                            "读取图片文件失败: {}",
                            e
                        )));
                    }
                }
            }
            _ => {}
        }
    }

    let Some(message) = message else {
        return error_response(RelayError::InvalidArgument(
            "missing \"message\" field".into(),
        ));
    };
    let Some((bytes, content_type, filename)) = file else {
        return error_response(RelayError::InvalidArgument("missing \"file\" field".into()));
    };

    match state
        .relay
        .chat_with_image(&message, bytes, &content_type, &filename)
        .await
    {
        Ok(generation) => Json(Generation { generation }).into_response(),
        Err(e) => error_response(e),
    }
}

// ---------------------------------------------------------------
// Status
// ---------------------------------------------------------------

/// GET /ai/status — upstream configuration summary.
async fn get_status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let llm = &state.llm;
    Json(serde_json::json!({
        "llmAvailable": llm.is_configured(),
        "baseUrl": llm.base_url,
        "model": llm.model,
        "visionModel": llm.vision_model(),
    }))
}

// ---------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------

fn error_response(err: RelayError) -> Response {
    (status_for(&err), Json(serde_json::json!({ "error": err.to_string() }))).into_response()
}

fn status_for(err: &RelayError) -> StatusCode {
    match err {
        RelayError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        RelayError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        RelayError::Upstream(_) => StatusCode::BAD_GATEWAY,
        RelayError::Io(_) | RelayError::Json(_) | RelayError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_map_to_distinct_statuses() {
        assert_eq!(
            status_for(&RelayError::InvalidArgument("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&RelayError::UnsupportedMediaType("x".into())),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            status_for(&RelayError::Upstream("x".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&RelayError::Internal("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn upstream_error_body_carries_message_verbatim() {
        let err = RelayError::Upstream("API error 500: overloaded".into());
        let body = serde_json::json!({ "error": err.to_string() });
        assert_eq!(body["error"], "API error 500: overloaded");
    }
}
