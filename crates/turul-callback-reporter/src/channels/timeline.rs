//! Task-scoped timeline record update: state, result and result code on the
//! record whose id is the task instance id.

use async_trait::async_trait;
use turul_callback_client::{AuthScheme, RequestBody};
use turul_callback_protocol::{TaskOutcome, encoder};

use super::{ChannelContext, ChannelResult, ReportPhase, ReportingChannel};

pub struct TimelineRecordChannel {
    auth: AuthScheme,
}

impl TimelineRecordChannel {
    pub fn new(auth: AuthScheme) -> Self {
        Self { auth }
    }
}

#[async_trait]
impl ReportingChannel for TimelineRecordChannel {
    fn name(&self) -> &'static str {
        "timeline_record"
    }

    fn is_authoritative(&self) -> bool {
        true
    }

    async fn report(&self, cx: &ChannelContext<'_>, outcome: &TaskOutcome) -> ChannelResult {
        let task_id = &cx.correlation.task_instance_id;
        let body = match encoder::encode_timeline_record_patch(task_id, outcome) {
            Ok(body) => body,
            Err(err) => {
                return ChannelResult::failure(self.name(), ReportPhase::Completed, None, err.to_string());
            }
        };

        tracing::debug!(task_id = %task_id, result = %outcome.result, "Updating task timeline record");
        let call = cx
            .api
            .patch(cx.endpoints.records(), &RequestBody::json(body), &cx.credential(self.auth))
            .await;

        ChannelResult::from_call(self.name(), ReportPhase::Completed, call)
    }
}
