//! Accept loop over a real socket

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use turul_callback_reporter::{CallbackController, SimulatedWork};

use crate::{CallbackServer, WELCOME_MESSAGE};

#[tokio::test]
async fn test_serve_and_shut_down() {
    let controller = CallbackController::builder()
        .channels(Vec::new())
        .work(Arc::new(SimulatedWork::new(Duration::ZERO)))
        .build()
        .unwrap();
    let server = CallbackServer::builder()
        .controller(Arc::new(controller))
        .shutdown_grace(Duration::from_secs(1))
        .build()
        .unwrap();

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

    let response = reqwest::get(format!("http://{}/api/FunctionAPIResponse", addr))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), WELCOME_MESSAGE);

    let response = reqwest::Client::new()
        .post(format!("http://{}/api/FunctionCallback", addr))
        .body("{}")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    shutdown_tx.send(()).unwrap();
    serving.await.unwrap().unwrap();
}
