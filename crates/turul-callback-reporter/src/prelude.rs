//! Common imports for building and driving a callback controller

pub use crate::channels::{
    CallbackVariableChannel, ChannelContext, ChannelResult, LifecycleEventChannel,
    LogFeedChannel, ReportPhase, ReportingChannel, TimelineRecordChannel, VariableTarget,
};
pub use crate::config::{ChannelAuth, ChannelConfig, ReporterConfig, WorkConfig};
pub use crate::controller::{CallbackController, CallbackResponse, InvocationReport};
pub use crate::error::ReportError;
pub use crate::state_machine::InvocationState;
pub use crate::work::{ProgressSender, SimulatedWork, TaskWork, WorkError, WorkSummary};

pub use turul_callback_protocol::{CorrelationContext, TaskOutcome, TaskResult, ValidationPolicy};
