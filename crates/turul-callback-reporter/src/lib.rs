//! # Callback Reporter
//!
//! Reports the outcome of long-running work back to a pipeline orchestrator
//! that is waiting on a deferred task.
//!
//! An invocation carries a [`CorrelationContext`](turul_callback_protocol::CorrelationContext)
//! identifying the waiting task. The [`CallbackController`] validates it, runs
//! the [`TaskWork`], then reports through every registered [`ReportingChannel`]:
//!
//! - callback variable embedded in the job record (JSON-Patch fallback)
//! - task timeline record state and result
//! - `TaskStarted` / `TaskCompleted` plan events
//! - job log feed lines
//!
//! Every channel is best-effort; failures are returned as [`ChannelResult`]s.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use turul_callback_reporter::prelude::*;
//!
//! # async fn example(ctx: CorrelationContext) -> Result<(), ReportError> {
//! let controller = CallbackController::builder()
//!     .config(ReporterConfig::default())
//!     .work(Arc::new(SimulatedWork::new(Duration::from_secs(1)).with_ticks(2)))
//!     .build()?;
//!
//! let response = controller.handle(&ctx).await;
//! println!("{} {}", response.status, response.body);
//! # Ok(())
//! # }
//! ```

pub mod channels;
pub mod config;
pub mod controller;
pub mod error;
pub mod prelude;
pub mod state_machine;
pub mod work;

#[cfg(test)]
mod tests;

pub use channels::{ChannelContext, ChannelResult, ReportPhase, ReportingChannel};
pub use config::{ChannelAuth, ChannelConfig, ReporterConfig, WorkConfig};
pub use controller::{
    CallbackController, CallbackControllerBuilder, CallbackResponse, DISPATCH_MESSAGE,
    InvocationReport,
};
pub use error::ReportError;
pub use state_machine::InvocationState;
pub use work::{ProgressSender, SimulatedWork, TaskWork, WorkError, WorkSummary};
