//! Error types for the trigger server

use hyper::StatusCode;

/// Result type for trigger server operations
pub type Result<T> = std::result::Result<T, CallbackServerError>;

#[derive(Debug, thiserror::Error)]
pub enum CallbackServerError {
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read request body: {0}")]
    Body(String),

    #[error("Request body exceeds {0} bytes")]
    BodyTooLarge(usize),
}

impl CallbackServerError {
    /// Status returned to the trigger when this error ends a request
    pub fn status_code(&self) -> StatusCode {
        match self {
            CallbackServerError::Body(_) => StatusCode::BAD_REQUEST,
            CallbackServerError::BodyTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
