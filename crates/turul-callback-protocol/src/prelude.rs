//! Convenience re-exports for the common protocol types.

pub use crate::context::{CorrelationContext, CorrelationField, ValidationError, ValidationPolicy};
pub use crate::encoder::{self, VariableEncoding};
pub use crate::events::{EventName, LifecycleEvent};
pub use crate::feed::LogFeedEntry;
pub use crate::outcome::{TaskOutcome, TaskResult};
pub use crate::timeline::{ListEnvelope, RecordResult, RecordState, TimelineRecord, VariableValue};
pub use crate::variable::{CallbackPayload, CallbackStatus, CallbackVariable, ResultCode};
pub use crate::{ProtocolError, Result};
