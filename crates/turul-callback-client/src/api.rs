//! Orchestrator API abstraction
//!
//! [`OrchestratorApi`] is the seam between the reporting channels and the
//! network. The production implementation is
//! [`HttpOrchestratorClient`](crate::HttpOrchestratorClient); tests substitute
//! recording fakes.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::credential::Credential;
use crate::error::ClientResult;

/// `Content-Type` for plain JSON bodies
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// `Content-Type` for JSON-Patch documents
pub const CONTENT_TYPE_JSON_PATCH: &str = "application/json-patch+json";

/// HTTP method of an orchestrator call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    Get,
    Post,
    Patch,
}

impl std::fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiMethod::Get => write!(f, "GET"),
            ApiMethod::Post => write!(f, "POST"),
            ApiMethod::Patch => write!(f, "PATCH"),
        }
    }
}

/// JSON request body with its content type
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBody {
    pub json: Value,
    pub content_type: &'static str,
}

impl RequestBody {
    /// `application/json` body
    pub fn json(json: Value) -> Self {
        Self {
            json,
            content_type: CONTENT_TYPE_JSON,
        }
    }

    /// `application/json-patch+json` body
    pub fn json_patch(json: Value) -> Self {
        Self {
            json,
            content_type: CONTENT_TYPE_JSON_PATCH,
        }
    }
}

/// Status and raw body of an orchestrator answer, successful or not
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> ClientResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Minimal JSON client over the orchestrator's REST surface.
///
/// Implementations must:
/// - attach exactly the given credential to each call and nothing inherited
///   from earlier calls
/// - return non-2xx answers as `Ok(ApiResponse)`; `Err` is reserved for
///   transport failures
/// - log every failed call with URL, status and body
#[async_trait]
pub trait OrchestratorApi: Send + Sync {
    async fn get(&self, url: &Url, credential: &Credential) -> ClientResult<ApiResponse>;

    async fn post(
        &self,
        url: &Url,
        body: &RequestBody,
        credential: &Credential,
    ) -> ClientResult<ApiResponse>;

    async fn patch(
        &self,
        url: &Url,
        body: &RequestBody,
        credential: &Credential,
    ) -> ClientResult<ApiResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_success_range() {
        assert!(ApiResponse::new(200, "").is_success());
        assert!(ApiResponse::new(204, "").is_success());
        assert!(!ApiResponse::new(199, "").is_success());
        assert!(!ApiResponse::new(404, "").is_success());
        assert!(!ApiResponse::new(500, "").is_success());
    }

    #[test]
    fn test_response_json_decoding() {
        let response = ApiResponse::new(200, r#"{"count": 0, "value": []}"#);
        let value: Value = response.json().unwrap();
        assert_eq!(value["count"], 0);

        assert!(ApiResponse::new(200, "<html>").json::<Value>().is_err());
    }

    #[test]
    fn test_body_content_types() {
        assert_eq!(RequestBody::json(Value::Null).content_type, "application/json");
        assert_eq!(
            RequestBody::json_patch(Value::Null).content_type,
            "application/json-patch+json"
        );
    }
}
