//! Completion encoder: builds the request bodies sent to the orchestrator.
//!
//! All functions are pure. Anything time dependent is taken from the inputs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::events::{EventName, LifecycleEvent};
use crate::feed::LogFeedEntry;
use crate::outcome::{TaskOutcome, TaskResult};
use crate::timeline::{ListEnvelope, TimelineRecord};
use crate::variable::CallbackVariable;

/// The two accepted shapes for writing a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableEncoding {
    /// `variables` map inside a timeline record patch (records endpoint)
    RecordEmbedded,
    /// JSON-Patch `add` operation (jobs/variables endpoint)
    JsonPatch,
}

/// A single JSON-Patch operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: String,
    pub path: String,
    pub value: Value,
}

impl PatchOperation {
    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: "add".to_string(),
            path: path.into(),
            value,
        }
    }
}

/// Records patch setting state/result on the record `id`
pub fn encode_timeline_record_patch(id: &str, outcome: &TaskOutcome) -> crate::Result<Value> {
    encode_records(vec![TimelineRecord::completion(id, outcome)?])
}

/// Wrap already-built records as `{value: [...], count: n}`
pub fn encode_records(records: Vec<TimelineRecord>) -> crate::Result<Value> {
    Ok(serde_json::to_value(ListEnvelope::from_vec(records))?)
}

/// Variable patch for `target_id` in the requested shape.
///
/// The JSON-Patch shape carries no record id; the target is part of the
/// jobs/variables URL instead.
pub fn encode_variable_patch(
    target_id: &str,
    variable: &CallbackVariable,
    encoding: VariableEncoding,
) -> crate::Result<Value> {
    match encoding {
        VariableEncoding::RecordEmbedded => {
            encode_variable_record_patch(target_id, None, variable)
        }
        VariableEncoding::JsonPatch => {
            let ops = vec![PatchOperation::add(
                format!("/variables/{}", variable.name),
                Value::String(variable.value.clone()),
            )];
            Ok(serde_json::to_value(ops)?)
        }
    }
}

/// Record-embedded variable patch that keeps the variables already present on
/// `existing` (read-modify-write against a fetched record).
///
/// Only the `variables` map of `existing` is carried over; state and result of
/// the fetched record are never echoed back. Secret or valueless variables are
/// left out so the write cannot blank them.
pub fn encode_variable_record_patch(
    target_id: &str,
    existing: Option<&TimelineRecord>,
    variable: &CallbackVariable,
) -> crate::Result<Value> {
    let mut record = TimelineRecord::new(target_id);
    if let Some(vars) = existing.and_then(|r| r.variables.as_ref()) {
        for (name, value) in vars.iter().filter(|(_, value)| value.is_round_trippable()) {
            record = record.with_variable(name.clone(), value.clone());
        }
    }
    let record = record.with_variable(variable.name.clone(), variable.to_variable_value());

    encode_records(vec![record])
}

/// Plan event body
pub fn encode_event(
    name: EventName,
    job_id: &str,
    task_id: &str,
    result: Option<TaskResult>,
) -> crate::Result<Value> {
    let event = LifecycleEvent {
        name,
        job_id: job_id.to_string(),
        task_id: task_id.to_string(),
        result,
    };
    Ok(serde_json::to_value(event)?)
}

/// Log feed body with a single timestamped line
pub fn encode_log_feed(entry: &LogFeedEntry) -> crate::Result<Value> {
    Ok(serde_json::to_value(ListEnvelope::single(entry.line()))?)
}
