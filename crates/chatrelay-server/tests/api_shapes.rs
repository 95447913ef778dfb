//! API shape tests — validates that response bodies match the surface the
//! original clients consume: `{generation}` on success, `{error}` on failure,
//! tagged JSON events on the SSE stream.

use chatrelay_client::{Generation, StreamEvent};

/// Success responses wrap the generated text under key `generation`.
#[test]
fn test_generation_response_shape() {
    let body = serde_json::to_value(Generation {
        generation: "Hi there".into(),
    })
    .unwrap();

    assert_eq!(body, serde_json::json!({ "generation": "Hi there" }));
}

/// Error responses carry a single human-readable `error` field.
#[test]
fn test_error_response_shape() {
    let body = serde_json::json!({ "error": "不支持的文件类型，请上传图片文件" });

    assert!(body["error"].is_string());
    assert!(body.get("generation").is_none());
}

/// Token events serialize as `{"type": "token", "content": ...}`.
#[test]
fn test_stream_token_event_shape() {
    let event = serde_json::to_value(StreamEvent::Token {
        content: "Hi".into(),
    })
    .unwrap();

    assert_eq!(event["type"], "token");
    assert_eq!(event["content"], "Hi");
}

/// Done events carry model, tokensUsed, and duration.
#[test]
fn test_stream_done_event_shape() {
    let event = serde_json::to_value(StreamEvent::Done {
        model: "deepseek-chat".into(),
        tokens_used: 42,
        duration: 1200,
    })
    .unwrap();

    assert_eq!(event["type"], "done");
    assert_eq!(event["model"], "deepseek-chat");
    assert!(event["tokensUsed"].is_number());
    assert!(event["duration"].is_number());
}

/// Error events carry the upstream message under `error`.
#[test]
fn test_stream_error_event_shape() {
    let event = serde_json::to_value(StreamEvent::Error {
        error: "API error 429: rate limited".into(),
    })
    .unwrap();

    assert_eq!(event["type"], "error");
    assert_eq!(event["error"], "API error 429: rate limited");
}

/// Status endpoint shape consumed by dashboards.
#[test]
fn test_status_response_shape() {
    let status = serde_json::json!({
        "llmAvailable": true,
        "baseUrl": "https://api.deepseek.com/v1",
        "model": "deepseek-chat",
        "visionModel": "qwen-vl-plus",
    });

    assert!(status["llmAvailable"].is_boolean());
    assert!(status["baseUrl"].is_string());
    assert!(status["model"].is_string());
    assert!(status["visionModel"].is_string());
}
