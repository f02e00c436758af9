//! Timeline records as exchanged with the records endpoint.
//!
//! A record is addressed by `id`. The job record (`id = jobId`) and the task
//! record (`id = taskInstanceId`) are different records: a patch aimed at one
//! is silently accepted but has no effect on the other.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::outcome::{TaskOutcome, TaskResult};
use crate::variable::ResultCode;

/// Lifecycle state of a timeline record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordState {
    Pending,
    InProgress,
    Completed,
}

/// Result stored on a timeline record.
///
/// The orchestrator knows more results than a reporter ever writes; all of them
/// are accepted when decoding fetched records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordResult {
    Succeeded,
    SucceededWithIssues,
    Failed,
    Canceled,
    Skipped,
    Abandoned,
}

impl From<TaskResult> for RecordResult {
    fn from(result: TaskResult) -> Self {
        match result {
            TaskResult::Succeeded => RecordResult::Succeeded,
            TaskResult::Failed => RecordResult::Failed,
        }
    }
}

/// Variable value as stored in a record's `variables` map.
///
/// The orchestrator omits `value` for secret variables when records are read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub is_secret: bool,
}

impl VariableValue {
    pub fn new(value: impl Into<String>, is_secret: bool) -> Self {
        Self {
            value: Some(value.into()),
            is_secret,
        }
    }

    /// A fetched value that can be written back unchanged: not secret and
    /// actually carrying its value
    pub fn is_round_trippable(&self) -> bool {
        !self.is_secret && self.value.is_some()
    }
}

/// Partial timeline record. Only fields that are set are serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<RecordState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<RecordResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_complete: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<BTreeMap<String, VariableValue>>,
}

impl TimelineRecord {
    /// An empty patch for the record with `id`
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: None,
            result: None,
            result_code: None,
            percent_complete: None,
            finish_time: None,
            variables: None,
        }
    }

    /// Completion patch for a task-scoped record.
    ///
    /// Marks the record completed and carries a `resultCode` that asks the
    /// orchestrator to complete the task explicitly.
    pub fn completion(id: impl Into<String>, outcome: &TaskOutcome) -> crate::Result<Self> {
        let code = ResultCode::for_outcome(outcome).with_complete_task(true);
        Ok(Self::new(id)
            .with_state(RecordState::Completed)
            .with_result(outcome.result.into())
            .with_result_code(code.encode()?)
            .with_percent_complete(outcome.percent_complete)
            .with_finish_time(outcome.finish_time))
    }

    pub fn with_state(mut self, state: RecordState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_result(mut self, result: RecordResult) -> Self {
        self.result = Some(result);
        self
    }

    pub fn with_result_code(mut self, result_code: impl Into<String>) -> Self {
        self.result_code = Some(result_code.into());
        self
    }

    pub fn with_percent_complete(mut self, percent: u8) -> Self {
        self.percent_complete = Some(percent.min(100));
        self
    }

    pub fn with_finish_time(mut self, finish_time: DateTime<Utc>) -> Self {
        self.finish_time = Some(finish_time);
        self
    }

    /// Add or replace one variable, keeping any others already present
    pub fn with_variable(mut self, name: impl Into<String>, value: VariableValue) -> Self {
        self.variables
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value);
        self
    }

    /// Look a variable up by name
    pub fn variable(&self, name: &str) -> Option<&VariableValue> {
        self.variables.as_ref().and_then(|vars| vars.get(name))
    }

    /// Linear scan for the record with `id`
    pub fn find<'a>(records: &'a [TimelineRecord], id: &str) -> Option<&'a TimelineRecord> {
        records.iter().find(|record| record.id == id)
    }
}

/// `{count, value}` wrapper used by both the records endpoint and the log feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEnvelope<T> {
    #[serde(default)]
    pub count: usize,
    pub value: Vec<T>,
}

impl<T> ListEnvelope<T> {
    pub fn single(item: T) -> Self {
        Self {
            count: 1,
            value: vec![item],
        }
    }

    pub fn from_vec(value: Vec<T>) -> Self {
        Self {
            count: value.len(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_record_serializes_only_set_fields() {
        let record = TimelineRecord::new("job-1")
            .with_variable("A", VariableValue::new("1", false));

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({"id": "job-1", "variables": {"A": {"value": "1", "isSecret": false}}})
        );
    }

    #[test]
    fn test_completion_record_fields() {
        let outcome = TaskOutcome::succeeded("done");
        let record = TimelineRecord::completion("task-1", &outcome).unwrap();
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["id"], "task-1");
        assert_eq!(value["state"], "completed");
        assert_eq!(value["result"], "succeeded");
        assert_eq!(value["percentComplete"], 100);
        assert!(value["finishTime"].is_string());
        assert!(value.get("variables").is_none());

        let code: serde_json::Value =
            serde_json::from_str(value["resultCode"].as_str().unwrap()).unwrap();
        assert_eq!(code["status"], "success");
        assert_eq!(code["message"], "done");
        assert_eq!(code["completeTask"], true);
    }

    #[test]
    fn test_decode_fetched_records_and_find_by_id() {
        let body = json!({
            "count": 2,
            "value": [
                {
                    "id": "job-1",
                    "type": "Job",
                    "state": "inProgress",
                    "result": null,
                    "percentComplete": null,
                    "variables": {"EXISTING": {"value": "x", "isSecret": false}}
                },
                {
                    "id": "task-1",
                    "type": "Task",
                    "state": "completed",
                    "result": "succeededWithIssues",
                    "finishTime": "2025-01-01T10:00:00.123Z"
                }
            ]
        });

        let envelope: ListEnvelope<TimelineRecord> = serde_json::from_value(body).unwrap();
        assert_eq!(envelope.count, 2);

        let job = TimelineRecord::find(&envelope.value, "job-1").unwrap();
        assert_eq!(job.state, Some(RecordState::InProgress));
        assert_eq!(job.variable("EXISTING").unwrap().value.as_deref(), Some("x"));

        let task = TimelineRecord::find(&envelope.value, "task-1").unwrap();
        assert_eq!(task.result, Some(RecordResult::SucceededWithIssues));
        assert!(task.variables.is_none());

        assert!(TimelineRecord::find(&envelope.value, "missing").is_none());
    }

    #[test]
    fn test_secret_variable_decodes_without_value() {
        let record: TimelineRecord = serde_json::from_value(json!({
            "id": "job-1",
            "variables": {
                "SECRET_PAT": {"isSecret": true},
                "PLAIN": {"value": "1", "isSecret": false}
            }
        }))
        .unwrap();

        let secret = record.variable("SECRET_PAT").unwrap();
        assert_eq!(secret.value, None);
        assert!(!secret.is_round_trippable());
        assert!(record.variable("PLAIN").unwrap().is_round_trippable());
        assert!(!VariableValue::new("hidden", true).is_round_trippable());
    }
}
