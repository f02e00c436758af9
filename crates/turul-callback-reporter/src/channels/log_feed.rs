//! Job console log feed. Lines are posted at start, on each progress tick and
//! once the outcome is known.

use async_trait::async_trait;
use turul_callback_client::{AuthScheme, RequestBody};
use turul_callback_protocol::{LogFeedEntry, TaskOutcome, encoder};

use super::{ChannelContext, ChannelResult, ReportPhase, ReportingChannel};

pub struct LogFeedChannel {
    auth: AuthScheme,
}

impl LogFeedChannel {
    pub fn new(auth: AuthScheme) -> Self {
        Self { auth }
    }

    async fn append(
        &self,
        cx: &ChannelContext<'_>,
        phase: ReportPhase,
        message: String,
    ) -> ChannelResult {
        let entry = LogFeedEntry::now(message);
        let body = match encoder::encode_log_feed(&entry) {
            Ok(body) => body,
            Err(err) => return ChannelResult::failure(self.name(), phase, None, err.to_string()),
        };

        let call = cx
            .api
            .post(cx.endpoints.feed(), &RequestBody::json(body), &cx.credential(self.auth))
            .await;

        ChannelResult::from_call(self.name(), phase, call)
    }
}

#[async_trait]
impl ReportingChannel for LogFeedChannel {
    fn name(&self) -> &'static str {
        "log_feed"
    }

    async fn on_started(&self, cx: &ChannelContext<'_>) -> Option<ChannelResult> {
        let message = format!(
            "Task {} started, processing in background",
            cx.correlation.task_instance_id
        );
        Some(self.append(cx, ReportPhase::Started, message).await)
    }

    async fn on_progress(&self, cx: &ChannelContext<'_>, percent: u8) -> Option<ChannelResult> {
        Some(
            self.append(cx, ReportPhase::Progress, format!("Progress: {}%", percent))
                .await,
        )
    }

    async fn report(&self, cx: &ChannelContext<'_>, outcome: &TaskOutcome) -> ChannelResult {
        let message = format!("Task {}: {}", outcome.result, outcome.message);
        self.append(cx, ReportPhase::Completed, message).await
    }
}
