//! Work collaborator: the long-running operation an invocation reports on.
//!
//! The controller runs [`TaskWork`] on its own tokio task so that a panic in
//! the work is observed as a [`JoinError`](tokio::task::JoinError) and reported
//! as a failed outcome instead of tearing down the handler.

use std::any::Any;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use turul_callback_protocol::TaskOutcome;

use crate::config::WorkConfig;

/// Message reported when work finishes without its own summary
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Function completed successfully!";

/// Result of successful work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkSummary {
    pub message: String,
}

impl WorkSummary {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for WorkSummary {
    fn default() -> Self {
        Self::new(DEFAULT_SUCCESS_MESSAGE)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum WorkError {
    #[error("{0}")]
    Failed(String),
}

impl WorkError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Progress reporting handle given to running work.
///
/// Sends are fire-and-forget; a closed receiver is ignored.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: mpsc::UnboundedSender<u8>,
}

impl ProgressSender {
    pub(crate) fn new(tx: mpsc::UnboundedSender<u8>) -> Self {
        Self { tx }
    }

    /// Report percent complete, clamped to 100
    pub fn report(&self, percent: u8) {
        let _ = self.tx.send(percent.min(100));
    }
}

/// The operation whose completion is reported back to the orchestrator
#[async_trait]
pub trait TaskWork: Send + Sync {
    async fn run(&self, progress: ProgressSender) -> Result<WorkSummary, WorkError>;
}

/// Sleep-based stand-in for real work, reporting evenly spaced progress ticks
#[derive(Debug, Clone)]
pub struct SimulatedWork {
    duration: Duration,
    ticks: u32,
    failure: Option<String>,
}

impl SimulatedWork {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            ticks: 0,
            failure: None,
        }
    }

    pub fn from_config(config: &WorkConfig) -> Self {
        Self::new(config.duration).with_ticks(config.progress_ticks)
    }

    pub fn with_ticks(mut self, ticks: u32) -> Self {
        self.ticks = ticks;
        self
    }

    /// Finish with a failure after the full duration
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }
}

impl Default for SimulatedWork {
    fn default() -> Self {
        Self::from_config(&WorkConfig::default())
    }
}

#[async_trait]
impl TaskWork for SimulatedWork {
    async fn run(&self, progress: ProgressSender) -> Result<WorkSummary, WorkError> {
        if self.ticks == 0 {
            tokio::time::sleep(self.duration).await;
        } else {
            let step = self.duration / self.ticks;
            for tick in 1..=self.ticks {
                tokio::time::sleep(step).await;
                let percent = (tick as u64 * 100 / self.ticks as u64) as u8;
                progress.report(percent);
            }
        }

        match &self.failure {
            Some(message) => Err(WorkError::failed(message.clone())),
            None => Ok(WorkSummary::default()),
        }
    }
}

/// Map the joined work task onto a task outcome
pub(crate) fn outcome_from_join(
    joined: Result<Result<WorkSummary, WorkError>, tokio::task::JoinError>,
) -> TaskOutcome {
    match joined {
        Ok(Ok(summary)) => TaskOutcome::succeeded(summary.message),
        Ok(Err(err)) => TaskOutcome::failed(err.to_string()),
        Err(join_err) if join_err.is_panic() => TaskOutcome::failed(format!(
            "work panicked: {}",
            panic_message(join_err.into_panic())
        )),
        Err(join_err) => TaskOutcome::failed(format!("work aborted: {}", join_err)),
    }
}

pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
