//! Task outcome produced once per invocation after the work phase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Final result of the external task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskResult {
    Succeeded,
    Failed,
}

impl TaskResult {
    /// Wire form used by records, events and the callback variable
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskResult::Succeeded => "succeeded",
            TaskResult::Failed => "failed",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TaskResult::Succeeded)
    }
}

impl std::fmt::Display for TaskResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one invocation's work phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskOutcome {
    pub result: TaskResult,
    pub message: String,
    /// Always within `0..=100`
    pub percent_complete: u8,
    pub finish_time: DateTime<Utc>,
}

impl TaskOutcome {
    pub fn new(result: TaskResult, message: impl Into<String>) -> Self {
        Self {
            result,
            message: message.into(),
            percent_complete: 100,
            finish_time: Utc::now(),
        }
    }

    pub fn succeeded(message: impl Into<String>) -> Self {
        Self::new(TaskResult::Succeeded, message)
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(TaskResult::Failed, message)
    }

    /// Override the completion percentage, clamped to 100
    pub fn with_percent_complete(mut self, percent: u8) -> Self {
        self.percent_complete = percent.min(100);
        self
    }

    pub fn with_finish_time(mut self, finish_time: DateTime<Utc>) -> Self {
        self.finish_time = finish_time;
        self
    }
}
