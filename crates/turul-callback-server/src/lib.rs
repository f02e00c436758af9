//! # Callback Trigger Server
//!
//! HTTP front end for the callback reporter. It serves two routes:
//!
//! - `/api/FunctionCallback`: reads the eight correlation headers, logs the
//!   request body, runs a [`CallbackController`](turul_callback_reporter::CallbackController)
//!   invocation and answers `200 {message}`, `400 {error, missing}` or `500 {error}`
//! - `/api/FunctionAPIResponse`: a plain greeting
//!
//! Unknown paths answer `404`, other methods on known paths `405`.

pub mod adapter;
pub mod cors;
pub mod error;
pub mod handler;
pub mod server;

#[cfg(test)]
mod tests;

// Re-export main types
pub use adapter::extract_correlation_context;
pub use cors::CorsLayer;
pub use error::{CallbackServerError, Result};
pub use handler::{CallbackHandler, WELCOME_MESSAGE};
pub use server::{CallbackServer, CallbackServerBuilder, ServerConfig};
