//! Log feed lines appended to the job's console output.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFeedEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl LogFeedEntry {
    pub fn new(timestamp: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            message: message.into(),
        }
    }

    /// Entry stamped with the current time
    pub fn now(message: impl Into<String>) -> Self {
        Self::new(Utc::now(), message)
    }

    /// Single console line: `<rfc3339 timestamp> <message>`
    pub fn line(&self) -> String {
        format!(
            "{} {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.message
        )
    }
}
