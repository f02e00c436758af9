//! Unified error type for an invocation.
//!
//! Channel-level failures never surface here; they are recorded as
//! [`ChannelResult`](crate::ChannelResult) values. Only failures that stop an
//! invocation before any channel ran are errors.

use turul_callback_client::ClientError;
use turul_callback_protocol::ValidationError;

use crate::state_machine::InvocationState;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid invocation state transition: {current:?} -> {requested:?}")]
    InvalidTransition {
        current: InvocationState,
        requested: InvocationState,
    },

    #[error("Invocation is in terminal state: {0:?}")]
    TerminalState(InvocationState),

    #[error("Orchestrator client error: {0}")]
    Client(#[from] ClientError),

    #[error("Unhandled failure: {0}")]
    Unhandled(String),
}

impl ReportError {
    /// HTTP status the trigger receives for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ReportError::Validation(_) => 400,
            _ => 500,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ReportError::Validation(_))
    }
}
