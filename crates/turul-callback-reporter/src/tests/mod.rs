//! Test modules for turul-callback-reporter
//!
//! Channel and controller tests run against [`RecordingApi`], an in-memory
//! orchestrator that records every call and answers from scripted rules.

mod channel_tests;

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use turul_callback_client::{
    ApiMethod, ApiResponse, ClientError, ClientResult, Credential, OrchestratorApi, RequestBody,
};
use turul_callback_protocol::CorrelationContext;
use url::Url;

pub(crate) const TOKEN: &str = "secret-token";

/// Fully populated correlation context
pub(crate) fn context() -> CorrelationContext {
    CorrelationContext {
        plan_url: "https://orchestrator.test/org".to_string(),
        project_id: "proj".to_string(),
        hub_name: "build".to_string(),
        plan_id: "plan-1".to_string(),
        job_id: "job-1".to_string(),
        timeline_id: "tl-1".to_string(),
        task_instance_id: "task-1".to_string(),
        auth_token: TOKEN.to_string(),
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub method: ApiMethod,
    pub url: Url,
    pub body: Option<RequestBody>,
    pub credential: Credential,
}

impl RecordedCall {
    pub fn json(&self) -> &Value {
        &self.body.as_ref().expect("call without body").json
    }

    /// `(method, last path segment)`
    pub fn route(&self) -> (ApiMethod, String) {
        let last = self
            .url
            .path_segments()
            .and_then(|segments| segments.last())
            .unwrap_or_default()
            .to_string();
        (self.method, last)
    }
}

#[derive(Clone)]
enum Scripted {
    Status(u16, String),
    TransportFailure,
}

struct Rule {
    method: ApiMethod,
    path_suffix: String,
    body_contains: Option<String>,
    response: Scripted,
}

impl Rule {
    fn matches(&self, method: ApiMethod, url: &Url, body: Option<&RequestBody>) -> bool {
        if self.method != method || !url.path().ends_with(&self.path_suffix) {
            return false;
        }
        match (&self.body_contains, body) {
            (None, _) => true,
            (Some(needle), Some(body)) => body.json.to_string().contains(needle.as_str()),
            (Some(_), None) => false,
        }
    }
}

/// Orchestrator fake: records calls, answers 200 with an empty listing unless
/// a rule says otherwise. Later rules take precedence.
#[derive(Default)]
pub(crate) struct RecordingApi {
    calls: Mutex<Vec<RecordedCall>>,
    rules: Mutex<Vec<Rule>>,
}

impl RecordingApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, method: ApiMethod, path_suffix: &str, status: u16, body: &str) {
        self.push_rule(method, path_suffix, None, Scripted::Status(status, body.to_string()));
    }

    /// Answer only calls whose JSON body contains `needle`
    pub fn respond_when(
        &self,
        method: ApiMethod,
        path_suffix: &str,
        needle: &str,
        status: u16,
        body: &str,
    ) {
        self.push_rule(
            method,
            path_suffix,
            Some(needle.to_string()),
            Scripted::Status(status, body.to_string()),
        );
    }

    pub fn fail_transport(&self, method: ApiMethod, path_suffix: &str) {
        self.push_rule(method, path_suffix, None, Scripted::TransportFailure);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn routes(&self) -> Vec<(ApiMethod, String)> {
        self.calls.lock().iter().map(RecordedCall::route).collect()
    }

    pub fn calls_to(&self, method: ApiMethod, path_suffix: &str) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.method == method && c.url.path().ends_with(path_suffix))
            .cloned()
            .collect()
    }

    fn push_rule(
        &self,
        method: ApiMethod,
        path_suffix: &str,
        body_contains: Option<String>,
        response: Scripted,
    ) {
        self.rules.lock().push(Rule {
            method,
            path_suffix: path_suffix.to_string(),
            body_contains,
            response,
        });
    }

    fn answer(
        &self,
        method: ApiMethod,
        url: &Url,
        body: Option<&RequestBody>,
        credential: &Credential,
    ) -> ClientResult<ApiResponse> {
        self.calls.lock().push(RecordedCall {
            method,
            url: url.clone(),
            body: body.cloned(),
            credential: credential.clone(),
        });

        let scripted = self
            .rules
            .lock()
            .iter()
            .rev()
            .find(|rule| rule.matches(method, url, body))
            .map(|rule| rule.response.clone());

        match scripted {
            Some(Scripted::Status(status, body)) => Ok(ApiResponse::new(status, body)),
            Some(Scripted::TransportFailure) => {
                Err(ClientError::config("simulated connection failure"))
            }
            None => Ok(ApiResponse::new(200, r#"{"count":0,"value":[]}"#)),
        }
    }
}

#[async_trait]
impl OrchestratorApi for RecordingApi {
    async fn get(&self, url: &Url, credential: &Credential) -> ClientResult<ApiResponse> {
        self.answer(ApiMethod::Get, url, None, credential)
    }

    async fn post(
        &self,
        url: &Url,
        body: &RequestBody,
        credential: &Credential,
    ) -> ClientResult<ApiResponse> {
        self.answer(ApiMethod::Post, url, Some(body), credential)
    }

    async fn patch(
        &self,
        url: &Url,
        body: &RequestBody,
        credential: &Credential,
    ) -> ClientResult<ApiResponse> {
        self.answer(ApiMethod::Patch, url, Some(body), credential)
    }
}
