//! Typed errors for the outbound clients and the content store.

use thiserror::Error;

/// Failure of an outbound HTTP call (licensing site or LLM API).
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request timed out")]
    Timeout,

    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Parse(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("completion contained no text")]
    EmptyCompletion,
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else if e.is_decode() {
            ClientError::Parse(e.to_string())
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Parse(e.to_string())
    }
}

/// Failure of a content store mutation. Memory is untouched when one is returned.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The section failed to load and is read-only until restart.
    #[error("section '{0}' is unavailable")]
    SectionUnavailable(String),
}
