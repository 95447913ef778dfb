//! Error types for ChatRelay.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    /// Bad or missing request input.
    #[error("{0}")]
    InvalidArgument(String),

    /// Upload whose content type is not an image.
    #[error("{0}")]
    UnsupportedMediaType(String),

    /// Provider or network failure, carries the upstream message verbatim.
    #[error("{0}")]
    Upstream(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, RelayError>;
