//! Reporter configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use turul_callback_client::config::duration_serde;
use turul_callback_client::{AuthScheme, ClientConfig};
use turul_callback_protocol::ValidationPolicy;

/// Everything an invocation needs beyond its correlation context
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    /// Which correlation headers must be present
    pub validation: ValidationPolicy,

    /// Orchestrator client settings (timeouts, pool, api-versions)
    pub client: ClientConfig,

    /// Reporting channel selection and auth schemes
    pub channels: ChannelConfig,

    /// Simulated work parameters
    pub work: WorkConfig,
}

/// Reporting channel configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Post `TaskStarted`/`TaskCompleted` plan events
    pub enable_events: bool,

    /// Append lines to the job log feed
    pub enable_log_feed: bool,

    /// Retry a rejected embedded variable write through the jobs/variables endpoint
    pub variable_fallback: bool,

    /// Also embed the callback variable on the task-scoped record
    pub mirror_task_variable: bool,

    /// Mark the callback variable secret
    pub secret_variable: bool,

    pub auth: ChannelAuth,
}

/// Authorization scheme per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelAuth {
    pub records: AuthScheme,
    pub variables: AuthScheme,
    pub events: AuthScheme,
    pub feed: AuthScheme,
}

/// Simulated work configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkConfig {
    /// Total simulated duration
    #[serde(with = "duration_serde")]
    pub duration: Duration,

    /// Number of progress ticks reported across the duration
    pub progress_ticks: u32,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            enable_events: true,
            enable_log_feed: true,
            variable_fallback: true,
            mirror_task_variable: false,
            secret_variable: false,
            auth: ChannelAuth::default(),
        }
    }
}

impl Default for ChannelAuth {
    fn default() -> Self {
        Self {
            records: AuthScheme::Bearer,
            variables: AuthScheme::Bearer,
            events: AuthScheme::Basic,
            feed: AuthScheme::Basic,
        }
    }
}

impl Default for WorkConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(5),
            progress_ticks: 4,
        }
    }
}

impl ReporterConfig {
    pub fn with_validation(mut self, policy: ValidationPolicy) -> Self {
        self.validation = policy;
        self
    }

    pub fn with_channels(mut self, channels: ChannelConfig) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_work(mut self, work: WorkConfig) -> Self {
        self.work = work;
        self
    }

    /// Load from a JSON document; absent keys keep their defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
