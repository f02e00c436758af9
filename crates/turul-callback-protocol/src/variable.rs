//! The callback variable: the out-of-band completion signal.
//!
//! A separate polling component looks for a variable named
//! `AZURE_FUNCTION_CALLBACK_{taskInstanceId}` on the job or task record. Its
//! value is a JSON object `{result, resultCode}` where `resultCode` is itself a
//! JSON-encoded string `{status, message}`. The double encoding is part of the
//! contract and has to survive a round trip.

use serde::{Deserialize, Serialize};

use crate::outcome::{TaskOutcome, TaskResult};
use crate::timeline::VariableValue;

/// Name prefix of every callback variable
pub const CALLBACK_VARIABLE_PREFIX: &str = "AZURE_FUNCTION_CALLBACK_";

/// Coarse status carried inside `resultCode`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallbackStatus {
    Success,
    Failure,
}

impl From<TaskResult> for CallbackStatus {
    fn from(result: TaskResult) -> Self {
        match result {
            TaskResult::Succeeded => CallbackStatus::Success,
            TaskResult::Failed => CallbackStatus::Failure,
        }
    }
}

/// Inner `resultCode` document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultCode {
    pub status: CallbackStatus,
    pub message: String,
    /// Only set on task record patches, where it asks for explicit completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete_task: Option<bool>,
}

impl ResultCode {
    pub fn new(status: CallbackStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            complete_task: None,
        }
    }

    pub fn for_outcome(outcome: &TaskOutcome) -> Self {
        Self::new(outcome.result.into(), outcome.message.clone())
    }

    pub fn with_complete_task(mut self, complete: bool) -> Self {
        self.complete_task = Some(complete);
        self
    }

    /// JSON string form, as embedded in records and callback payloads
    pub fn encode(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(encoded: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(encoded)?)
    }
}

/// Outer callback document: `{result, resultCode}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackPayload {
    pub result: TaskResult,
    /// JSON-encoded [`ResultCode`]
    pub result_code: String,
}

/// Callback variable for one task instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackVariable {
    pub name: String,
    /// JSON-encoded [`CallbackPayload`]
    pub value: String,
    pub is_secret: bool,
}

impl CallbackVariable {
    /// Variable name for a task instance
    pub fn name_for(task_instance_id: &str) -> String {
        format!("{CALLBACK_VARIABLE_PREFIX}{task_instance_id}")
    }

    /// Build the variable reporting `outcome` for `task_instance_id`
    pub fn for_outcome(task_instance_id: &str, outcome: &TaskOutcome) -> crate::Result<Self> {
        let payload = CallbackPayload {
            result: outcome.result,
            result_code: ResultCode::for_outcome(outcome).encode()?,
        };

        Ok(Self {
            name: Self::name_for(task_instance_id),
            value: serde_json::to_string(&payload)?,
            is_secret: false,
        })
    }

    pub fn with_secret(mut self, is_secret: bool) -> Self {
        self.is_secret = is_secret;
        self
    }

    /// Value in the shape a record's `variables` map expects
    pub fn to_variable_value(&self) -> VariableValue {
        VariableValue::new(self.value.clone(), self.is_secret)
    }

    /// Undo both encoding layers
    pub fn decode(&self) -> crate::Result<(TaskResult, ResultCode)> {
        Self::decode_value(&self.value)
    }

    /// Undo both encoding layers of a raw variable value
    pub fn decode_value(value: &str) -> crate::Result<(TaskResult, ResultCode)> {
        let payload: CallbackPayload = serde_json::from_str(value)?;
        let code = ResultCode::decode(&payload.result_code)?;
        Ok((payload.result, code))
    }
}
