//! Callback orchestration controller.
//!
//! One invocation is a single pass through [`InvocationState`]:
//! validate the correlation context, run the work, then give every registered
//! channel its chance to report. Channel failures are collected as
//! [`ChannelResult`] values and never abort the pass; a channel that panics is
//! recorded as a failed attempt.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use turul_callback_client::{HttpOrchestratorClient, OrchestratorApi, OrchestratorEndpoints};
use turul_callback_protocol::{CorrelationContext, TaskOutcome};

use crate::channels::{
    ChannelContext, ChannelResult, ReportPhase, ReportingChannel, default_channels,
};
use crate::config::ReporterConfig;
use crate::error::ReportError;
use crate::state_machine::{InvocationState, advance};
use crate::work::{ProgressSender, SimulatedWork, TaskWork, outcome_from_join, panic_message};

/// Message returned to the trigger once an invocation has been dispatched
pub const DISPATCH_MESSAGE: &str =
    "Function received successfully. Processing in background. Will update task when complete.";

/// Everything that happened during one completed invocation
#[derive(Debug, Clone)]
pub struct InvocationReport {
    pub state: InvocationState,
    pub outcome: TaskOutcome,
    /// Channel attempts in the order they were made
    pub results: Vec<ChannelResult>,
}

impl InvocationReport {
    pub fn all_ok(&self) -> bool {
        self.results.iter().all(|r| r.ok)
    }

    /// Names of channels with at least one failed attempt, in first-failure order
    pub fn failed_channels(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        for result in self.results.iter().filter(|r| !r.ok) {
            if !names.contains(&result.channel) {
                names.push(result.channel);
            }
        }
        names
    }

    pub fn results_for<'a>(&'a self, channel: &'a str) -> impl Iterator<Item = &'a ChannelResult> {
        self.results.iter().filter(move |r| r.channel == channel)
    }
}

/// Response the trigger receives
#[derive(Debug, Clone)]
pub struct CallbackResponse {
    pub status: u16,
    pub body: Value,
    /// Present when the invocation ran to completion
    pub report: Option<InvocationReport>,
}

impl CallbackResponse {
    pub fn dispatched(report: InvocationReport) -> Self {
        Self {
            status: 200,
            body: json!({ "message": DISPATCH_MESSAGE }),
            report: Some(report),
        }
    }

    pub fn from_error(err: &ReportError) -> Self {
        let body = match err {
            ReportError::Validation(validation) => json!({
                "error": validation.to_string(),
                "missing": validation
                    .missing
                    .iter()
                    .map(|field| field.header_name())
                    .collect::<Vec<_>>(),
            }),
            other => json!({ "error": other.to_string() }),
        };

        Self {
            status: err.status_code(),
            body,
            report: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Drives one invocation from validation to the last reporting channel
pub struct CallbackController {
    api: Arc<dyn OrchestratorApi>,
    work: Arc<dyn TaskWork>,
    channels: Vec<Arc<dyn ReportingChannel>>,
    config: ReporterConfig,
}

impl CallbackController {
    pub fn builder() -> CallbackControllerBuilder {
        CallbackControllerBuilder::default()
    }

    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    /// Registered channel names in reporting order
    pub fn channel_names(&self) -> Vec<&'static str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    /// Run an invocation and map it to the trigger response
    pub async fn handle(&self, ctx: &CorrelationContext) -> CallbackResponse {
        match self.run(ctx).await {
            Ok(report) => CallbackResponse::dispatched(report),
            Err(err) => CallbackResponse::from_error(&err),
        }
    }

    /// Run one invocation.
    ///
    /// Returns `Err` only when nothing was reported: the context failed
    /// validation or no orchestrator endpoint could be derived from it.
    pub async fn run(&self, ctx: &CorrelationContext) -> Result<InvocationReport, ReportError> {
        let mut state = InvocationState::Idle;
        advance(&mut state, InvocationState::Validating)?;

        if let Err(validation) = ctx.validate(self.config.validation) {
            advance(&mut state, InvocationState::Rejected)?;
            warn!(error = %validation, "Rejecting invocation");
            return Err(validation.into());
        }

        let endpoints = match OrchestratorEndpoints::new(ctx, &self.config.client.api_versions) {
            Ok(endpoints) => endpoints,
            Err(err) => {
                error!(error = %err, "Cannot derive orchestrator endpoints");
                return Err(err.into());
            }
        };

        advance(&mut state, InvocationState::Working)?;
        info!(
            task_id = %ctx.task_instance_id,
            job_id = %ctx.job_id,
            "Invocation dispatched"
        );

        let cx = ChannelContext {
            api: self.api.as_ref(),
            correlation: ctx,
            endpoints: &endpoints,
        };
        let mut results = Vec::new();

        for channel in &self.channels {
            match isolate(channel.as_ref(), ReportPhase::Started, channel.on_started(&cx)).await {
                Ok(Some(result)) | Err(result) => record(channel.as_ref(), result, &mut results),
                Ok(None) => {}
            }
        }

        let outcome = self.run_work(&cx, &mut results).await;

        advance(&mut state, InvocationState::Reporting)?;
        self.report_outcome(&cx, &outcome, &mut results).await;

        advance(&mut state, InvocationState::Done)?;
        let report = InvocationReport {
            state,
            outcome,
            results,
        };

        info!(
            task_id = %ctx.task_instance_id,
            result = %report.outcome.result,
            failed_channels = ?report.failed_channels(),
            "Invocation reported"
        );

        Ok(report)
    }

    /// Run the work on its own task, forwarding progress ticks to the channels
    async fn run_work(&self, cx: &ChannelContext<'_>, results: &mut Vec<ChannelResult>) -> TaskOutcome {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let progress = ProgressSender::new(tx);
        let work = Arc::clone(&self.work);

        let handle = tokio::spawn(async move { work.run(progress).await });

        // Closes once the work task finishes and drops its sender
        while let Some(percent) = rx.recv().await {
            debug!(percent, "Work progress");
            for channel in &self.channels {
                let hook = channel.on_progress(cx, percent);
                match isolate(channel.as_ref(), ReportPhase::Progress, hook).await {
                    Ok(Some(result)) | Err(result) => record(channel.as_ref(), result, results),
                    Ok(None) => {}
                }
            }
        }

        let outcome = outcome_from_join(handle.await);
        if outcome.result.is_success() {
            info!(message = %outcome.message, "Work succeeded");
        } else {
            warn!(message = %outcome.message, "Work failed");
        }
        outcome
    }

    async fn report_outcome(
        &self,
        cx: &ChannelContext<'_>,
        outcome: &TaskOutcome,
        results: &mut Vec<ChannelResult>,
    ) {
        for channel in &self.channels {
            let report = channel.report(cx, outcome);
            let (Ok(result) | Err(result)) =
                isolate(channel.as_ref(), ReportPhase::Completed, report).await;
            record(channel.as_ref(), result, results);
        }
    }

    /// Best-effort failed-outcome report for an invocation that died without
    /// reporting.
    ///
    /// Runs only the completion hooks. Returns `None` when the context fails
    /// validation or yields no endpoints.
    pub async fn report_failure(
        &self,
        ctx: &CorrelationContext,
        message: impl Into<String>,
    ) -> Option<InvocationReport> {
        if ctx.validate(self.config.validation).is_err() {
            return None;
        }
        let endpoints = match OrchestratorEndpoints::new(ctx, &self.config.client.api_versions) {
            Ok(endpoints) => endpoints,
            Err(err) => {
                warn!(error = %err, "Cannot report failure: no orchestrator endpoints");
                return None;
            }
        };

        let mut state = InvocationState::Idle;
        for next in [
            InvocationState::Validating,
            InvocationState::Working,
            InvocationState::Reporting,
        ] {
            advance(&mut state, next).ok()?;
        }

        let cx = ChannelContext {
            api: self.api.as_ref(),
            correlation: ctx,
            endpoints: &endpoints,
        };
        let outcome = TaskOutcome::failed(message);
        let mut results = Vec::new();
        self.report_outcome(&cx, &outcome, &mut results).await;
        advance(&mut state, InvocationState::Done).ok()?;

        let report = InvocationReport {
            state,
            outcome,
            results,
        };
        warn!(
            task_id = %ctx.task_instance_id,
            failed_channels = ?report.failed_channels(),
            "Failed outcome reported after unhandled error"
        );
        Some(report)
    }
}

/// Await one channel hook, turning a panic into a failed attempt
async fn isolate<T>(
    channel: &dyn ReportingChannel,
    phase: ReportPhase,
    hook: impl Future<Output = T>,
) -> Result<T, ChannelResult> {
    AssertUnwindSafe(hook).catch_unwind().await.map_err(|payload| {
        ChannelResult::failure(
            channel.name(),
            phase,
            None,
            format!("channel panicked: {}", panic_message(payload)),
        )
    })
}

fn record(channel: &dyn ReportingChannel, result: ChannelResult, results: &mut Vec<ChannelResult>) {
    if result.ok {
        debug!(
            channel = result.channel,
            phase = ?result.phase,
            status = ?result.status_code,
            fallback = result.fallback_used,
            "Reporting channel succeeded"
        );
    } else if channel.is_authoritative() {
        error!(
            channel = result.channel,
            phase = ?result.phase,
            status = ?result.status_code,
            error = ?result.error,
            "Reporting channel failed"
        );
    } else {
        warn!(
            channel = result.channel,
            phase = ?result.phase,
            status = ?result.status_code,
            error = ?result.error,
            "Best-effort reporting channel failed; continuing"
        );
    }
    results.push(result);
}

/// Builder for [`CallbackController`]
#[derive(Default)]
pub struct CallbackControllerBuilder {
    api: Option<Arc<dyn OrchestratorApi>>,
    work: Option<Arc<dyn TaskWork>>,
    channels: Option<Vec<Arc<dyn ReportingChannel>>>,
    extra_channels: Vec<Arc<dyn ReportingChannel>>,
    config: ReporterConfig,
}

impl CallbackControllerBuilder {
    pub fn config(mut self, config: ReporterConfig) -> Self {
        self.config = config;
        self
    }

    /// Orchestrator client; defaults to an [`HttpOrchestratorClient`] built from the config
    pub fn api(mut self, api: Arc<dyn OrchestratorApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// Work collaborator; defaults to [`SimulatedWork`] built from the config
    pub fn work(mut self, work: Arc<dyn TaskWork>) -> Self {
        self.work = Some(work);
        self
    }

    /// Replace the configured channel list
    pub fn channels(mut self, channels: Vec<Arc<dyn ReportingChannel>>) -> Self {
        self.channels = Some(channels);
        self
    }

    /// Append a channel after the configured ones
    pub fn channel(mut self, channel: Arc<dyn ReportingChannel>) -> Self {
        self.extra_channels.push(channel);
        self
    }

    pub fn build(self) -> Result<CallbackController, ReportError> {
        let api: Arc<dyn OrchestratorApi> = match self.api {
            Some(api) => api,
            None => Arc::new(HttpOrchestratorClient::new(&self.config.client)?),
        };
        let work: Arc<dyn TaskWork> = match self.work {
            Some(work) => work,
            None => Arc::new(SimulatedWork::from_config(&self.config.work)),
        };
        let mut channels = self
            .channels
            .unwrap_or_else(|| default_channels(&self.config.channels));
        channels.extend(self.extra_channels);

        Ok(CallbackController {
            api,
            work,
            channels,
            config: self.config,
        })
    }
}
