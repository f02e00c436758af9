//! Shared fixtures for the end-to-end tests
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, Response};
use serde_json::Value;
use turul_callback_reporter::{CallbackController, ReporterConfig, SimulatedWork};
use turul_callback_server::{CallbackHandler, CallbackServer};

pub const TOKEN: &str = "tok";
/// `Basic base64(":tok")`
pub const BASIC_AUTH: &str = "Basic OnRvaw==";
pub const BEARER_AUTH: &str = "Bearer tok";

const PLAN_BASE: &str = "/proj/_apis/distributedtask/hubs/build/plans/plan-1";

pub fn records_path() -> String {
    format!("{PLAN_BASE}/timelines/tl-1/records")
}

pub fn variables_path() -> String {
    format!("{PLAN_BASE}/jobs/job-1/variables")
}

pub fn events_path() -> String {
    format!("{PLAN_BASE}/events")
}

pub fn feed_path() -> String {
    format!("{PLAN_BASE}/timelines/tl-1/records/job-1/feed")
}

/// The eight correlation headers pointing at `plan_url`
pub fn correlation_headers(plan_url: &str) -> Vec<(&'static str, String)> {
    vec![
        ("PlanUrl", plan_url.to_string()),
        ("ProjectId", "proj".to_string()),
        ("HubName", "build".to_string()),
        ("PlanId", "plan-1".to_string()),
        ("JobId", "job-1".to_string()),
        ("TimelineId", "tl-1".to_string()),
        ("TaskInstanceId", "task-1".to_string()),
        ("AuthToken", TOKEN.to_string()),
    ]
}

pub fn instant_work() -> SimulatedWork {
    SimulatedWork::new(Duration::ZERO)
}

pub fn controller(config: ReporterConfig, work: SimulatedWork) -> Arc<CallbackController> {
    Arc::new(
        CallbackController::builder()
            .config(config)
            .work(Arc::new(work))
            .build()
            .expect("controller should build"),
    )
}

pub fn server(config: ReporterConfig, work: SimulatedWork) -> CallbackServer {
    CallbackServer::builder()
        .controller(controller(config, work))
        .shutdown_grace(Duration::from_secs(1))
        .build()
        .expect("server should build")
}

pub fn handler(config: ReporterConfig, work: SimulatedWork) -> CallbackHandler {
    server(config, work).handler().clone()
}

pub fn callback_request(plan_url: &str, body: &'static str) -> Request<Full<Bytes>> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/FunctionCallback");
    for (name, value) in correlation_headers(plan_url) {
        builder = builder.header(name, value);
    }
    builder
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .unwrap()
}

pub async fn body_json(response: Response<Full<Bytes>>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
