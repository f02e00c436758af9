//! Direct channel tests against a recording orchestrator

use serde_json::json;
use turul_callback_client::{
    ApiMethod, ApiVersions, AuthScheme, Credential, OrchestratorEndpoints,
};
use turul_callback_protocol::{CallbackVariable, TaskOutcome, TaskResult};

use super::{RecordingApi, TOKEN, context};
use crate::channels::{
    CallbackVariableChannel, ChannelContext, LifecycleEventChannel, LogFeedChannel, ReportPhase,
    ReportingChannel, TimelineRecordChannel, VariableTarget,
};

fn endpoints() -> OrchestratorEndpoints {
    OrchestratorEndpoints::new(&context(), &ApiVersions::default()).unwrap()
}

#[tokio::test]
async fn test_timeline_channel_patches_task_record() {
    let api = RecordingApi::new();
    let ctx = context();
    let endpoints = endpoints();
    let cx = ChannelContext {
        api: &*api,
        correlation: &ctx,
        endpoints: &endpoints,
    };

    let result = TimelineRecordChannel::new(AuthScheme::Bearer)
        .report(&cx, &TaskOutcome::succeeded("done"))
        .await;

    assert!(result.ok);
    assert_eq!(result.phase, ReportPhase::Completed);

    let calls = api.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, ApiMethod::Patch);
    assert_eq!(calls[0].url, *endpoints.records());
    assert_eq!(calls[0].credential, Credential::bearer(TOKEN));

    let record = &calls[0].json()["value"][0];
    assert_eq!(calls[0].json()["count"], 1);
    assert_eq!(record["id"], "task-1");
    assert_eq!(record["state"], "completed");
    assert_eq!(record["result"], "succeeded");
    assert_eq!(record["percentComplete"], 100);
    assert!(record.get("variables").is_none());
}

#[tokio::test]
async fn test_timeline_channel_reports_rejection() {
    let api = RecordingApi::new();
    api.respond(ApiMethod::Patch, "/records", 403, "forbidden");
    let ctx = context();
    let endpoints = endpoints();
    let cx = ChannelContext {
        api: &*api,
        correlation: &ctx,
        endpoints: &endpoints,
    };

    let channel = TimelineRecordChannel::new(AuthScheme::Bearer);
    let result = channel.report(&cx, &TaskOutcome::failed("broke")).await;

    assert!(channel.is_authoritative());
    assert!(!result.ok);
    assert_eq!(result.status_code, Some(403));
    assert_eq!(result.error.as_deref(), Some("HTTP 403: forbidden"));
}

#[tokio::test]
async fn test_event_channel_started_and_completed() {
    let api = RecordingApi::new();
    let ctx = context();
    let endpoints = endpoints();
    let cx = ChannelContext {
        api: &*api,
        correlation: &ctx,
        endpoints: &endpoints,
    };
    let channel = LifecycleEventChannel::new(AuthScheme::Basic);

    let started = channel.on_started(&cx).await.unwrap();
    assert_eq!(started.phase, ReportPhase::Started);
    assert!(channel.on_progress(&cx, 50).await.is_none());
    channel.report(&cx, &TaskOutcome::failed("broke")).await;

    let calls = api.calls_to(ApiMethod::Post, "/events");
    assert_eq!(calls.len(), 2);
    assert_eq!(
        *calls[0].json(),
        json!({"name": "TaskStarted", "jobId": "job-1", "taskId": "task-1"})
    );
    assert_eq!(
        *calls[1].json(),
        json!({"name": "TaskCompleted", "jobId": "job-1", "taskId": "task-1", "result": "failed"})
    );
    assert_eq!(calls[0].credential, Credential::basic(TOKEN));
}

#[tokio::test]
async fn test_log_feed_lines() {
    let api = RecordingApi::new();
    let ctx = context();
    let endpoints = endpoints();
    let cx = ChannelContext {
        api: &*api,
        correlation: &ctx,
        endpoints: &endpoints,
    };
    let channel = LogFeedChannel::new(AuthScheme::Basic);

    channel.on_started(&cx).await;
    let progress = channel.on_progress(&cx, 50).await.unwrap();
    assert_eq!(progress.phase, ReportPhase::Progress);
    channel.report(&cx, &TaskOutcome::succeeded("all good")).await;

    let lines: Vec<String> = api
        .calls_to(ApiMethod::Post, "/feed")
        .iter()
        .map(|c| {
            assert_eq!(c.json()["count"], 1);
            c.json()["value"][0].as_str().unwrap().to_string()
        })
        .collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("Task task-1 started, processing in background"));
    assert!(lines[1].ends_with(" Progress: 50%"));
    assert!(lines[2].ends_with(" Task succeeded: all good"));
    // "<rfc3339 millis>Z <message>"
    assert_eq!(lines[1].find('Z'), Some(23));
}

#[tokio::test]
async fn test_variable_channel_merges_existing_record_variables() {
    let api = RecordingApi::new();
    api.respond(
        ApiMethod::Get,
        "/records",
        200,
        r#"{
            "count": 2,
            "value": [
                {"id": "task-1", "state": "inProgress", "name": "Wait for callback"},
                {"id": "job-1", "state": "inProgress", "result": null,
                 "variables": {"OTHER": {"value": "1", "isSecret": false}}}
            ]
        }"#,
    );
    let ctx = context();
    let endpoints = endpoints();
    let cx = ChannelContext {
        api: &*api,
        correlation: &ctx,
        endpoints: &endpoints,
    };

    let result = CallbackVariableChannel::new(VariableTarget::Job, AuthScheme::Bearer)
        .report(&cx, &TaskOutcome::succeeded("ok"))
        .await;
    assert!(result.ok);
    assert!(!result.fallback_used);

    let patch = &api.calls_to(ApiMethod::Patch, "/records")[0];
    let record = &patch.json()["value"][0];
    assert_eq!(record["id"], "job-1");
    assert!(record.get("state").is_none());
    assert_eq!(record["variables"]["OTHER"]["value"], "1");

    let value = record["variables"]["AZURE_FUNCTION_CALLBACK_task-1"]["value"]
        .as_str()
        .unwrap();
    let (result, code) = CallbackVariable::decode_value(value).unwrap();
    assert_eq!(result, TaskResult::Succeeded);
    assert_eq!(code.message, "ok");
}

#[tokio::test]
async fn test_variable_channel_leaves_secret_variables_alone() {
    let api = RecordingApi::new();
    api.respond(
        ApiMethod::Get,
        "/records",
        200,
        r#"{"count": 1, "value": [{"id": "job-1",
            "variables": {"SECRET_PAT": {"isSecret": true}, "OTHER": {"value": "1"}}}]}"#,
    );
    let ctx = context();
    let endpoints = endpoints();
    let cx = ChannelContext {
        api: &*api,
        correlation: &ctx,
        endpoints: &endpoints,
    };

    let result = CallbackVariableChannel::new(VariableTarget::Job, AuthScheme::Bearer)
        .report(&cx, &TaskOutcome::succeeded("ok"))
        .await;
    assert!(result.ok);

    let patches = api.calls_to(ApiMethod::Patch, "/records");
    let variables = &patches[0].json()["value"][0]["variables"];
    assert!(variables.get("SECRET_PAT").is_none());
    assert_eq!(variables["OTHER"]["value"], "1");
    assert!(variables["AZURE_FUNCTION_CALLBACK_task-1"].is_object());
}

#[tokio::test]
async fn test_variable_channel_writes_without_listing() {
    let api = RecordingApi::new();
    api.fail_transport(ApiMethod::Get, "/records");
    let ctx = context();
    let endpoints = endpoints();
    let cx = ChannelContext {
        api: &*api,
        correlation: &ctx,
        endpoints: &endpoints,
    };

    let result = CallbackVariableChannel::new(VariableTarget::Job, AuthScheme::Bearer)
        .report(&cx, &TaskOutcome::succeeded("ok"))
        .await;

    assert!(result.ok);
    let patch = &api.calls_to(ApiMethod::Patch, "/records")[0];
    let variables = patch.json()["value"][0]["variables"].as_object().unwrap();
    assert_eq!(variables.len(), 1);
}

#[tokio::test]
async fn test_variable_channel_json_patch_fallback() {
    let api = RecordingApi::new();
    api.respond(ApiMethod::Patch, "/records", 400, "variables not allowed");
    let ctx = context();
    let endpoints = endpoints();
    let cx = ChannelContext {
        api: &*api,
        correlation: &ctx,
        endpoints: &endpoints,
    };

    let result = CallbackVariableChannel::new(VariableTarget::Job, AuthScheme::Bearer)
        .with_fallback(true)
        .report(&cx, &TaskOutcome::succeeded("ok"))
        .await;

    assert!(result.ok);
    assert!(result.fallback_used);

    let fallback = &api.calls_to(ApiMethod::Patch, "/variables")[0];
    assert_eq!(fallback.url, *endpoints.job_variables());
    let body = fallback.body.as_ref().unwrap();
    assert_eq!(body.content_type, "application/json-patch+json");
    assert_eq!(body.json[0]["op"], "add");
    assert_eq!(body.json[0]["path"], "/variables/AZURE_FUNCTION_CALLBACK_task-1");
    assert!(body.json[0]["value"].is_string());
}

#[tokio::test]
async fn test_task_variable_never_falls_back() {
    let api = RecordingApi::new();
    api.respond(ApiMethod::Patch, "/records", 400, "rejected");
    let ctx = context();
    let endpoints = endpoints();
    let cx = ChannelContext {
        api: &*api,
        correlation: &ctx,
        endpoints: &endpoints,
    };

    let channel = CallbackVariableChannel::new(VariableTarget::Task, AuthScheme::Bearer)
        .with_fallback(true);
    let result = channel.report(&cx, &TaskOutcome::succeeded("ok")).await;

    assert_eq!(channel.name(), "task_variable");
    assert!(!result.ok);
    assert!(!result.fallback_used);
    assert!(api.calls_to(ApiMethod::Patch, "/variables").is_empty());
    assert_eq!(
        api.calls_to(ApiMethod::Patch, "/records")[0].json()["value"][0]["id"],
        "task-1"
    );
}
