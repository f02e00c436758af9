//! # Callback Protocol
//!
//! Wire model and payload encoders for reporting the outcome of a long-running
//! external task back to a pipeline orchestrator.
//!
//! The orchestrator hands every invocation a bundle of correlation identifiers
//! (plan, project, hub, job, timeline, task instance) plus a bearer credential.
//! This crate models those identifiers, the task outcome, and the payloads the
//! orchestrator's distributed-task REST surface accepts:
//!
//! - timeline record patches (`{value: [record], count: 1}`)
//! - callback variables, either embedded in a record patch or as a JSON-Patch document
//! - lifecycle events (`TaskStarted` / `TaskCompleted`)
//! - log feed lines
//!
//! Everything here is pure: nothing in this crate performs I/O.
//!
//! ## Quick Start
//!
//! ```rust
//! use turul_callback_protocol::prelude::*;
//!
//! let outcome = TaskOutcome::succeeded("Function completed successfully!");
//! let variable = CallbackVariable::for_outcome("task-1", &outcome).unwrap();
//!
//! assert_eq!(variable.name, "AZURE_FUNCTION_CALLBACK_task-1");
//!
//! let (result, code) = variable.decode().unwrap();
//! assert_eq!(result, TaskResult::Succeeded);
//! assert_eq!(code.message, "Function completed successfully!");
//! ```

pub mod context;
pub mod encoder;
pub mod events;
pub mod feed;
pub mod outcome;
pub mod prelude;
pub mod timeline;
pub mod variable;

pub use context::{CorrelationContext, CorrelationField, ValidationError, ValidationPolicy};
pub use encoder::VariableEncoding;
pub use events::{EventName, LifecycleEvent};
pub use feed::LogFeedEntry;
pub use outcome::{TaskOutcome, TaskResult};
pub use timeline::{ListEnvelope, RecordResult, RecordState, TimelineRecord, VariableValue};
pub use variable::{CALLBACK_VARIABLE_PREFIX, CallbackPayload, CallbackStatus, CallbackVariable, ResultCode};

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while building or decoding protocol payloads
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
