//! Plan lifecycle events: `TaskStarted` before work, `TaskCompleted` after.

use async_trait::async_trait;
use turul_callback_client::{AuthScheme, RequestBody};
use turul_callback_protocol::{EventName, TaskOutcome, TaskResult, encoder};

use super::{ChannelContext, ChannelResult, ReportPhase, ReportingChannel};

pub struct LifecycleEventChannel {
    auth: AuthScheme,
}

impl LifecycleEventChannel {
    pub fn new(auth: AuthScheme) -> Self {
        Self { auth }
    }

    async fn post(
        &self,
        cx: &ChannelContext<'_>,
        phase: ReportPhase,
        name: EventName,
        result: Option<TaskResult>,
    ) -> ChannelResult {
        let body = match encoder::encode_event(
            name,
            &cx.correlation.job_id,
            &cx.correlation.task_instance_id,
            result,
        ) {
            Ok(body) => body,
            Err(err) => return ChannelResult::failure(self.name(), phase, None, err.to_string()),
        };

        tracing::debug!(event = name.as_str(), "Posting plan event");
        let call = cx
            .api
            .post(cx.endpoints.events(), &RequestBody::json(body), &cx.credential(self.auth))
            .await;

        ChannelResult::from_call(self.name(), phase, call)
    }
}

#[async_trait]
impl ReportingChannel for LifecycleEventChannel {
    fn name(&self) -> &'static str {
        "lifecycle_events"
    }

    async fn on_started(&self, cx: &ChannelContext<'_>) -> Option<ChannelResult> {
        Some(
            self.post(cx, ReportPhase::Started, EventName::TaskStarted, None)
                .await,
        )
    }

    async fn report(&self, cx: &ChannelContext<'_>, outcome: &TaskOutcome) -> ChannelResult {
        self.post(
            cx,
            ReportPhase::Completed,
            EventName::TaskCompleted,
            Some(outcome.result),
        )
        .await
    }
}
