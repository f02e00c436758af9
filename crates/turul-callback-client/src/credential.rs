//! Per-call credentials.
//!
//! Every request carries exactly one authorization scheme, chosen by the call
//! site. Neither type implements `Default`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Authorization scheme a call site uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`
    Bearer,
    /// `Authorization: Basic base64(":<token>")`
    Basic,
}

/// A token bound to an authorization scheme
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Bearer(String),
    /// HTTP Basic with an empty username and the token as password
    Basic { password: String },
}

impl Credential {
    pub fn new(scheme: AuthScheme, token: impl Into<String>) -> Self {
        match scheme {
            AuthScheme::Bearer => Self::Bearer(token.into()),
            AuthScheme::Basic => Self::Basic {
                password: token.into(),
            },
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self::new(AuthScheme::Bearer, token)
    }

    pub fn basic(token: impl Into<String>) -> Self {
        Self::new(AuthScheme::Basic, token)
    }

    pub fn scheme(&self) -> AuthScheme {
        match self {
            Self::Bearer(_) => AuthScheme::Bearer,
            Self::Basic { .. } => AuthScheme::Basic,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({:?}, <redacted>)", self.scheme())
    }
}
