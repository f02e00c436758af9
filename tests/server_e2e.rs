//! Full round trip over sockets: reqwest trigger → hyper server → controller →
//! mock orchestrator

mod common;

use std::time::Duration;

use common::*;
use mockito::Matcher;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use turul_callback_reporter::{DISPATCH_MESSAGE, ReporterConfig, WorkConfig};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_trigger_round_trip() {
    let mut orchestrator = mockito::Server::new_async().await;
    let task_record = orchestrator
        .mock("PATCH", records_path().as_str())
        .match_query(Matcher::Any)
        .match_body(Matcher::Regex(r#""result":"succeeded""#.to_string()))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    let progress = orchestrator
        .mock("POST", feed_path().as_str())
        .match_query(Matcher::Any)
        .match_body(Matcher::Regex("Progress: 100%".to_string()))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let config = ReporterConfig::default().with_work(WorkConfig {
        duration: Duration::from_millis(50),
        progress_ticks: 2,
    });
    let work = turul_callback_reporter::SimulatedWork::from_config(&config.work);
    let server = server(config, work);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let serving = tokio::spawn(async move {
        server
            .serve(listener, async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    let mut request = reqwest::Client::new()
        .post(format!("http://{}/api/FunctionCallback", addr))
        .body(r#"{"trigger": "pipeline"}"#);
    for (name, value) in correlation_headers(&orchestrator.url()) {
        request = request.header(name, value);
    }
    let response = request.send().await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], DISPATCH_MESSAGE);

    task_record.assert_async().await;
    progress.assert_async().await;

    shutdown_tx.send(()).unwrap();
    serving.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_api_response_route_over_socket() {
    let server = server(ReporterConfig::default(), instant_work());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let serving = tokio::spawn(async move {
        server
            .serve(listener, async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{}/api/FunctionAPIResponse", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.text().await.unwrap(),
        turul_callback_server::WELCOME_MESSAGE
    );

    let response = client
        .get(format!("http://{}/nowhere", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    shutdown_tx.send(()).unwrap();
    serving.await.unwrap().unwrap();
}
