//! Reporting channels.
//!
//! A channel is one independent way of telling the orchestrator about the
//! outcome. Channels run in registration order and each attempt yields a
//! [`ChannelResult`]; a failing channel never stops the ones after it.
//!
//! Hooks:
//! - [`ReportingChannel::on_started`] before work begins
//! - [`ReportingChannel::on_progress`] for each progress tick
//! - [`ReportingChannel::report`] once the outcome is known

mod events;
mod log_feed;
mod timeline;
mod variable;

pub use events::LifecycleEventChannel;
pub use log_feed::LogFeedChannel;
pub use timeline::TimelineRecordChannel;
pub use variable::{CallbackVariableChannel, VariableTarget};

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use turul_callback_client::{
    ApiResponse, AuthScheme, ClientResult, Credential, OrchestratorApi, OrchestratorEndpoints,
};
use turul_callback_protocol::{CorrelationContext, TaskOutcome};

use crate::config::ChannelConfig;

/// Everything a channel needs to address one invocation
pub struct ChannelContext<'a> {
    pub api: &'a dyn OrchestratorApi,
    pub correlation: &'a CorrelationContext,
    pub endpoints: &'a OrchestratorEndpoints,
}

impl ChannelContext<'_> {
    /// Fresh credential for one call
    pub fn credential(&self, scheme: AuthScheme) -> Credential {
        Credential::new(scheme, self.correlation.auth_token.as_str())
    }
}

/// Which hook produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPhase {
    Started,
    Progress,
    Completed,
}

/// Outcome of one channel attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelResult {
    pub channel: &'static str,
    pub phase: ReportPhase,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The alternate encoding was attempted
    pub fallback_used: bool,
}

impl ChannelResult {
    pub fn success(channel: &'static str, phase: ReportPhase, status_code: u16) -> Self {
        Self {
            channel,
            phase,
            ok: true,
            status_code: Some(status_code),
            error: None,
            fallback_used: false,
        }
    }

    pub fn failure(
        channel: &'static str,
        phase: ReportPhase,
        status_code: Option<u16>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            channel,
            phase,
            ok: false,
            status_code,
            error: Some(error.into()),
            fallback_used: false,
        }
    }

    /// Classify a finished orchestrator call
    pub fn from_call(
        channel: &'static str,
        phase: ReportPhase,
        call: ClientResult<ApiResponse>,
    ) -> Self {
        match call {
            Ok(response) if response.is_success() => {
                Self::success(channel, phase, response.status)
            }
            Ok(response) => Self::failure(
                channel,
                phase,
                Some(response.status),
                format!("HTTP {}: {}", response.status, response.body),
            ),
            Err(err) => Self::failure(channel, phase, None, err.to_string()),
        }
    }

    pub fn with_fallback_used(mut self, used: bool) -> Self {
        self.fallback_used = used;
        self
    }
}

/// One way of reporting an invocation to the orchestrator
#[async_trait]
pub trait ReportingChannel: Send + Sync {
    /// Stable name used in results and logs
    fn name(&self) -> &'static str;

    /// Failures of authoritative channels are logged as errors, others as warnings
    fn is_authoritative(&self) -> bool {
        false
    }

    #[allow(unused_variables)]
    async fn on_started(&self, cx: &ChannelContext<'_>) -> Option<ChannelResult> {
        None // Default: no-op
    }

    #[allow(unused_variables)]
    async fn on_progress(&self, cx: &ChannelContext<'_>, percent: u8) -> Option<ChannelResult> {
        None // Default: no-op
    }

    async fn report(&self, cx: &ChannelContext<'_>, outcome: &TaskOutcome) -> ChannelResult;
}

/// Channels in reporting order for `config`:
/// job variable, optional task variable, timeline record, events, log feed
pub fn default_channels(config: &ChannelConfig) -> Vec<Arc<dyn ReportingChannel>> {
    let mut channels: Vec<Arc<dyn ReportingChannel>> = vec![Arc::new(
        CallbackVariableChannel::new(VariableTarget::Job, config.auth.variables)
            .with_fallback(config.variable_fallback)
            .with_secret(config.secret_variable),
    )];

    if config.mirror_task_variable {
        channels.push(Arc::new(
            CallbackVariableChannel::new(VariableTarget::Task, config.auth.variables)
                .with_secret(config.secret_variable),
        ));
    }

    channels.push(Arc::new(TimelineRecordChannel::new(config.auth.records)));

    if config.enable_events {
        channels.push(Arc::new(LifecycleEventChannel::new(config.auth.events)));
    }
    if config.enable_log_feed {
        channels.push(Arc::new(LogFeedChannel::new(config.auth.feed)));
    }

    channels
}
