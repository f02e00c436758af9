//! Plan-level lifecycle events.

use serde::{Deserialize, Serialize};

use crate::outcome::TaskResult;

/// Event names understood by the plan events endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventName {
    TaskStarted,
    TaskCompleted,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::TaskStarted => "TaskStarted",
            EventName::TaskCompleted => "TaskCompleted",
        }
    }
}

/// `{name, jobId, taskId, result?}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleEvent {
    pub name: EventName,
    pub job_id: String,
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TaskResult>,
}

impl LifecycleEvent {
    pub fn started(job_id: impl Into<String>, task_id: impl Into<String>) -> Self {
        Self {
            name: EventName::TaskStarted,
            job_id: job_id.into(),
            task_id: task_id.into(),
            result: None,
        }
    }

    pub fn completed(
        job_id: impl Into<String>,
        task_id: impl Into<String>,
        result: TaskResult,
    ) -> Self {
        Self {
            name: EventName::TaskCompleted,
            job_id: job_id.into(),
            task_id: task_id.into(),
            result: Some(result),
        }
    }
}
