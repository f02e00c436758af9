//! HTTP request handler for the trigger routes

use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::header::{ALLOW, CONTENT_TYPE, HeaderValue};
use hyper::{Method, Request, Response, StatusCode};
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};
use turul_callback_protocol::CorrelationContext;
use turul_callback_reporter::{CallbackController, CallbackResponse, ReportError};

use crate::adapter::extract_correlation_context;
use crate::cors::CorsLayer;
use crate::error::CallbackServerError;
use crate::server::ServerConfig;

/// Plain-text greeting served on the API response route
pub const WELCOME_MESSAGE: &str = "Welcome to Azure Functions!";

const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Callback,
    ApiResponse,
    Preflight,
    MethodNotAllowed,
    NotFound,
}

/// Routes trigger requests to the callback controller
#[derive(Clone)]
pub struct CallbackHandler {
    config: Arc<ServerConfig>,
    controller: Arc<CallbackController>,
}

impl CallbackHandler {
    pub fn new(config: Arc<ServerConfig>, controller: Arc<CallbackController>) -> Self {
        Self { config, controller }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Handle one request. Never fails; every outcome is an HTTP response.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        debug!(%method, path = %path, "Handling request");

        let mut response = match self.route(&method, &path) {
            Route::Callback => self.handle_callback(req).await,
            Route::ApiResponse => text_response(StatusCode::OK, WELCOME_MESSAGE),
            Route::Preflight => empty_response(StatusCode::NO_CONTENT),
            Route::MethodNotAllowed => {
                let mut response = text_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
                response
                    .headers_mut()
                    .insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
                response
            }
            Route::NotFound => text_response(StatusCode::NOT_FOUND, "Not Found"),
        };

        if self.config.enable_cors {
            CorsLayer::apply_cors_headers(response.headers_mut());
        }
        response
    }

    fn route(&self, method: &Method, path: &str) -> Route {
        let target = if path == self.config.callback_path {
            Route::Callback
        } else if path == self.config.api_response_path {
            Route::ApiResponse
        } else {
            return Route::NotFound;
        };

        if *method == Method::OPTIONS {
            Route::Preflight
        } else if *method == Method::GET || *method == Method::POST {
            target
        } else {
            Route::MethodNotAllowed
        }
    }

    async fn handle_callback<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let ctx = extract_correlation_context(req.headers());

        let body = match read_body(req.into_body(), self.config.max_body_size).await {
            Ok(body) => body,
            Err(err) => {
                debug!(error = %err, "Rejecting callback request body");
                return json_response(err.status_code(), &json!({ "error": err.to_string() }));
            }
        };
        info!(
            bytes = body.len(),
            body = %String::from_utf8_lossy(&body),
            "Callback request received"
        );

        // Own task so a panic anywhere in the invocation still answers the trigger
        let controller = Arc::clone(&self.controller);
        let invocation_ctx = ctx.clone();
        let response =
            match tokio::spawn(async move { controller.handle(&invocation_ctx).await }).await {
                Ok(response) => response,
                Err(join_err) => {
                    error!(error = %join_err, "Invocation task failed");
                    self.report_failure(ctx, format!("invocation failed: {}", join_err))
                        .await;
                    CallbackResponse::from_error(&ReportError::Unhandled(join_err.to_string()))
                }
            };

        let status =
            StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        json_response(status, &response.body)
    }

    /// Tell the orchestrator the task failed, on a task of its own
    async fn report_failure(&self, ctx: CorrelationContext, message: String) {
        let controller = Arc::clone(&self.controller);
        match tokio::spawn(async move { controller.report_failure(&ctx, message).await }).await {
            Ok(Some(report)) => {
                info!(failed_channels = ?report.failed_channels(), "Failure report attempted")
            }
            Ok(None) => warn!("Failure could not be reported for this context"),
            Err(join_err) => error!(error = %join_err, "Failure report task failed"),
        }
    }
}

async fn read_body<B>(body: B, limit: usize) -> crate::Result<Bytes>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
            Err(CallbackServerError::BodyTooLarge(limit))
        }
        Err(err) => Err(CallbackServerError::Body(err.to_string())),
    }
}

fn json_response(status: StatusCode, body: &Value) -> Response<Full<Bytes>> {
    let bytes = match serde_json::to_vec(body) {
        Ok(bytes) => Bytes::from(bytes),
        Err(err) => {
            error!(error = %err, "Failed to serialize response body");
            return text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
        }
    };

    let mut response = Response::new(Full::new(bytes));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

fn text_response(status: StatusCode, text: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(text.as_bytes())));
    *response.status_mut() = status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

fn empty_response(status: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}
