//! Error types for orchestrator client operations
//!
//! Only transport-level problems are errors. A non-2xx answer from the
//! orchestrator is a regular [`ApiResponse`](crate::ApiResponse) whose status the
//! caller inspects.

use thiserror::Error;
use turul_callback_protocol::ProtocolError;

/// Result type for orchestrator client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Error type for orchestrator client operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network/connection errors (DNS, connect, timeout, broken body)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Endpoint could not be built from the correlation context
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload encoding errors
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid URL error
    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::InvalidUrl(message.into())
    }

    /// Check if the request never produced an HTTP response
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
