//! Configuration types for the orchestrator client

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main client configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Timeout configurations
    pub timeouts: TimeoutConfig,

    /// Connection configurations
    pub connection: ConnectionConfig,

    /// `api-version` query values per endpoint
    pub api_versions: ApiVersions,
}

/// Timeout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection timeout
    #[serde(with = "duration_serde")]
    pub connect: Duration,

    /// Request timeout for individual calls
    #[serde(with = "duration_serde")]
    pub request: Duration,
}

/// Connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// User agent string
    pub user_agent: Option<String>,

    /// Maximum number of idle connections per host
    pub max_idle_per_host: usize,

    /// Idle connection timeout
    #[serde(with = "duration_serde")]
    pub idle_timeout: Duration,
}

/// `api-version` values for each orchestrator endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiVersions {
    pub records: String,
    pub variables: String,
    pub events: String,
    pub feed: String,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            request: Duration::from_secs(30),
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            user_agent: Some(format!("turul-callback/{}", env!("CARGO_PKG_VERSION"))),
            max_idle_per_host: 5,
            idle_timeout: Duration::from_secs(90),
        }
    }
}

impl Default for ApiVersions {
    fn default() -> Self {
        Self {
            records: "7.1".to_string(),
            variables: "7.1".to_string(),
            events: "2.0-preview.1".to_string(),
            feed: "4.1".to_string(),
        }
    }
}

/// Serialize a `Duration` as whole milliseconds
pub mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
