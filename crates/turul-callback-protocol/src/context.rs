//! Correlation identifiers supplied by the orchestrator on every invocation.
//!
//! The orchestrator sends eight headers with each trigger. Together they address
//! the plan, the job, the timeline and the task instance that is waiting for a
//! completion signal, plus the short-lived token used to talk back.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the eight correlation fields, named as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CorrelationField {
    PlanUrl,
    ProjectId,
    HubName,
    PlanId,
    JobId,
    TimelineId,
    TaskInstanceId,
    AuthToken,
}

impl CorrelationField {
    /// All fields in header order
    pub const ALL: [CorrelationField; 8] = [
        CorrelationField::PlanUrl,
        CorrelationField::ProjectId,
        CorrelationField::HubName,
        CorrelationField::PlanId,
        CorrelationField::JobId,
        CorrelationField::TimelineId,
        CorrelationField::TaskInstanceId,
        CorrelationField::AuthToken,
    ];

    /// The minimum set that has to be present before callback mode is entered
    pub const MINIMAL: [CorrelationField; 3] = [
        CorrelationField::PlanUrl,
        CorrelationField::TaskInstanceId,
        CorrelationField::AuthToken,
    ];

    /// Header name carrying this field on the inbound trigger
    pub fn header_name(&self) -> &'static str {
        match self {
            CorrelationField::PlanUrl => "PlanUrl",
            CorrelationField::ProjectId => "ProjectId",
            CorrelationField::HubName => "HubName",
            CorrelationField::PlanId => "PlanId",
            CorrelationField::JobId => "JobId",
            CorrelationField::TimelineId => "TimelineId",
            CorrelationField::TaskInstanceId => "TaskInstanceId",
            CorrelationField::AuthToken => "AuthToken",
        }
    }
}

impl fmt::Display for CorrelationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header_name())
    }
}

/// How strictly the correlation headers are checked before entering callback mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// All eight fields must be non-empty
    #[default]
    Strict,
    /// Only `PlanUrl`, `TaskInstanceId` and `AuthToken` must be non-empty
    Minimal,
}

impl ValidationPolicy {
    /// Fields this policy requires
    pub fn required_fields(&self) -> &'static [CorrelationField] {
        match self {
            ValidationPolicy::Strict => &CorrelationField::ALL,
            ValidationPolicy::Minimal => &CorrelationField::MINIMAL,
        }
    }
}

/// Required correlation fields were missing or empty
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Missing required correlation headers: {}", join_fields(.missing))]
pub struct ValidationError {
    pub missing: Vec<CorrelationField>,
}

fn join_fields(fields: &[CorrelationField]) -> String {
    fields
        .iter()
        .map(|f| f.header_name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Correlation identifiers for one task instance.
///
/// All values are opaque strings; an absent header is represented as an empty string.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationContext {
    pub plan_url: String,
    pub project_id: String,
    pub hub_name: String,
    pub plan_id: String,
    pub job_id: String,
    pub timeline_id: String,
    pub task_instance_id: String,
    pub auth_token: String,
}

impl CorrelationContext {
    /// Build a context by looking every field up by its header name.
    ///
    /// Missing values become empty strings; surrounding whitespace is trimmed.
    pub fn from_lookup<F>(mut lookup: F) -> Self
    where
        F: FnMut(&'static str) -> Option<String>,
    {
        let mut ctx = Self::default();
        for field in CorrelationField::ALL {
            if let Some(value) = lookup(field.header_name()) {
                ctx.set_field(field, value.trim());
            }
        }
        ctx
    }

    /// Value of a single field
    pub fn field(&self, field: CorrelationField) -> &str {
        match field {
            CorrelationField::PlanUrl => &self.plan_url,
            CorrelationField::ProjectId => &self.project_id,
            CorrelationField::HubName => &self.hub_name,
            CorrelationField::PlanId => &self.plan_id,
            CorrelationField::JobId => &self.job_id,
            CorrelationField::TimelineId => &self.timeline_id,
            CorrelationField::TaskInstanceId => &self.task_instance_id,
            CorrelationField::AuthToken => &self.auth_token,
        }
    }

    /// Replace the value of a single field
    pub fn set_field(&mut self, field: CorrelationField, value: impl Into<String>) {
        let slot = match field {
            CorrelationField::PlanUrl => &mut self.plan_url,
            CorrelationField::ProjectId => &mut self.project_id,
            CorrelationField::HubName => &mut self.hub_name,
            CorrelationField::PlanId => &mut self.plan_id,
            CorrelationField::JobId => &mut self.job_id,
            CorrelationField::TimelineId => &mut self.timeline_id,
            CorrelationField::TaskInstanceId => &mut self.task_instance_id,
            CorrelationField::AuthToken => &mut self.auth_token,
        };
        *slot = value.into();
    }

    /// Fields required by `policy` that are empty
    pub fn missing_fields(&self, policy: ValidationPolicy) -> Vec<CorrelationField> {
        policy
            .required_fields()
            .iter()
            .copied()
            .filter(|f| self.field(*f).is_empty())
            .collect()
    }

    /// Check the context against a validation policy
    pub fn validate(&self, policy: ValidationPolicy) -> Result<(), ValidationError> {
        let missing = self.missing_fields(policy);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { missing })
        }
    }
}

// Keeps the orchestrator token out of logs.
impl fmt::Debug for CorrelationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrelationContext")
            .field("plan_url", &self.plan_url)
            .field("project_id", &self.project_id)
            .field("hub_name", &self.hub_name)
            .field("plan_id", &self.plan_id)
            .field("job_id", &self.job_id)
            .field("timeline_id", &self.timeline_id)
            .field("task_instance_id", &self.task_instance_id)
            .field(
                "auth_token",
                &if self.auth_token.is_empty() { "" } else { "<redacted>" },
            )
            .finish()
    }
}
