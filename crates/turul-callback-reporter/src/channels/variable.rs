//! Callback variable injection.
//!
//! The variable is embedded in the `variables` map of a timeline record,
//! merged with whatever the record already carries (GET, locate by id, PATCH).
//! When the orchestrator rejects that form for the job record, the variable is
//! written once more as a JSON-Patch against the jobs/variables endpoint.

use async_trait::async_trait;
use tracing::{debug, warn};
use turul_callback_client::{AuthScheme, RequestBody};
use turul_callback_protocol::{
    CallbackVariable, CorrelationContext, ListEnvelope, TaskOutcome, TimelineRecord,
    VariableEncoding, encoder,
};

use super::{ChannelContext, ChannelResult, ReportPhase, ReportingChannel};

/// Record the variable is embedded in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableTarget {
    /// Job-scoped record (`id = jobId`)
    Job,
    /// Task-scoped record (`id = taskInstanceId`)
    Task,
}

impl VariableTarget {
    pub fn record_id<'a>(&self, ctx: &'a CorrelationContext) -> &'a str {
        match self {
            VariableTarget::Job => &ctx.job_id,
            VariableTarget::Task => &ctx.task_instance_id,
        }
    }
}

pub struct CallbackVariableChannel {
    target: VariableTarget,
    auth: AuthScheme,
    fallback: bool,
    secret: bool,
}

impl CallbackVariableChannel {
    pub fn new(target: VariableTarget, auth: AuthScheme) -> Self {
        Self {
            target,
            auth,
            fallback: false,
            secret: false,
        }
    }

    /// Enable the jobs/variables JSON-Patch fallback (job target only)
    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_secret(mut self, secret: bool) -> Self {
        self.secret = secret;
        self
    }

    fn fallback_enabled(&self) -> bool {
        self.fallback && self.target == VariableTarget::Job
    }

    /// Current state of the target record, if it can be read
    async fn fetch_record(&self, cx: &ChannelContext<'_>, record_id: &str) -> Option<TimelineRecord> {
        let response = match cx.api.get(cx.endpoints.records(), &cx.credential(self.auth)).await {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                debug!(status = response.status, "Records listing unavailable; writing without merge");
                return None;
            }
            Err(err) => {
                debug!(error = %err, "Records listing failed; writing without merge");
                return None;
            }
        };

        match response.json::<ListEnvelope<TimelineRecord>>() {
            Ok(listing) => TimelineRecord::find(&listing.value, record_id).cloned(),
            Err(err) => {
                debug!(error = %err, "Records listing did not decode; writing without merge");
                None
            }
        }
    }

    async fn write_embedded(
        &self,
        cx: &ChannelContext<'_>,
        variable: &CallbackVariable,
    ) -> ChannelResult {
        let record_id = self.target.record_id(cx.correlation);
        let existing = self.fetch_record(cx, record_id).await;

        let body = match encoder::encode_variable_record_patch(record_id, existing.as_ref(), variable) {
            Ok(body) => body,
            Err(err) => {
                return ChannelResult::failure(self.name(), ReportPhase::Completed, None, err.to_string());
            }
        };

        debug!(
            record_id = %record_id,
            variable = %variable.name,
            merged = existing.is_some(),
            "Embedding callback variable in timeline record"
        );
        let call = cx
            .api
            .patch(cx.endpoints.records(), &RequestBody::json(body), &cx.credential(self.auth))
            .await;

        ChannelResult::from_call(self.name(), ReportPhase::Completed, call)
    }

    async fn write_json_patch(
        &self,
        cx: &ChannelContext<'_>,
        variable: &CallbackVariable,
    ) -> ChannelResult {
        let body = match encoder::encode_variable_patch(
            &cx.correlation.job_id,
            variable,
            VariableEncoding::JsonPatch,
        ) {
            Ok(body) => body,
            Err(err) => {
                return ChannelResult::failure(self.name(), ReportPhase::Completed, None, err.to_string());
            }
        };

        let call = cx
            .api
            .patch(
                cx.endpoints.job_variables(),
                &RequestBody::json_patch(body),
                &cx.credential(self.auth),
            )
            .await;

        ChannelResult::from_call(self.name(), ReportPhase::Completed, call).with_fallback_used(true)
    }
}

#[async_trait]
impl ReportingChannel for CallbackVariableChannel {
    fn name(&self) -> &'static str {
        match self.target {
            VariableTarget::Job => "job_variable",
            VariableTarget::Task => "task_variable",
        }
    }

    async fn report(&self, cx: &ChannelContext<'_>, outcome: &TaskOutcome) -> ChannelResult {
        let variable = match CallbackVariable::for_outcome(&cx.correlation.task_instance_id, outcome) {
            Ok(variable) => variable.with_secret(self.secret),
            Err(err) => {
                return ChannelResult::failure(self.name(), ReportPhase::Completed, None, err.to_string());
            }
        };

        let primary = self.write_embedded(cx, &variable).await;
        if primary.ok || !self.fallback_enabled() {
            return primary;
        }

        warn!(
            channel = self.name(),
            status = ?primary.status_code,
            "Embedded callback variable rejected; retrying via jobs/variables"
        );
        let fallback = self.write_json_patch(cx, &variable).await;
        if fallback.ok {
            return fallback;
        }

        warn!(
            channel = self.name(),
            variable = %variable.name,
            "Callback variable could not be written with either encoding"
        );
        let error = format!(
            "embedded: {}; json-patch: {}",
            primary.error.unwrap_or_default(),
            fallback.error.clone().unwrap_or_default()
        );
        ChannelResult {
            error: Some(error),
            ..fallback
        }
    }
}
