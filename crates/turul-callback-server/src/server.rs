//! Trigger HTTP server
//!
//! A hyper http1 accept loop serving the callback and API response routes.
//! Connections are tracked so that a shutdown signal stops accepting and waits
//! (bounded by [`ServerConfig::shutdown_grace`]) for in-flight invocations.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};
use turul_callback_reporter::CallbackController;

use crate::error::{CallbackServerError, Result};
use crate::handler::CallbackHandler;

/// Configuration for the trigger server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_address: SocketAddr,
    /// Path of the callback trigger route
    pub callback_path: String,
    /// Path of the plain API response route
    pub api_response_path: String,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum request body size
    pub max_body_size: usize,
    /// How long shutdown waits for in-flight requests
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 7071)),
            callback_path: "/api/FunctionCallback".to_string(),
            api_response_path: "/api/FunctionAPIResponse".to_string(),
            enable_cors: true,
            max_body_size: 1024 * 1024, // 1MB
            shutdown_grace: Duration::from_secs(30),
        }
    }
}

/// Builder for [`CallbackServer`]
#[derive(Default)]
pub struct CallbackServerBuilder {
    config: ServerConfig,
    controller: Option<Arc<CallbackController>>,
}

impl CallbackServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the bind address
    pub fn bind_address(mut self, addr: SocketAddr) -> Self {
        self.config.bind_address = addr;
        self
    }

    /// Set the callback trigger path
    pub fn callback_path(mut self, path: impl Into<String>) -> Self {
        self.config.callback_path = path.into();
        self
    }

    /// Set the API response path
    pub fn api_response_path(mut self, path: impl Into<String>) -> Self {
        self.config.api_response_path = path.into();
        self
    }

    /// Enable or disable CORS
    pub fn cors(mut self, enable: bool) -> Self {
        self.config.enable_cors = enable;
        self
    }

    /// Set maximum request body size
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    pub fn shutdown_grace(mut self, grace: Duration) -> Self {
        self.config.shutdown_grace = grace;
        self
    }

    /// Controller that runs each callback invocation
    pub fn controller(mut self, controller: Arc<CallbackController>) -> Self {
        self.controller = Some(controller);
        self
    }

    pub fn build(self) -> Result<CallbackServer> {
        let controller = self.controller.ok_or_else(|| {
            CallbackServerError::Config("A callback controller must be provided".to_string())
        })?;

        for path in [&self.config.callback_path, &self.config.api_response_path] {
            if !path.starts_with('/') {
                return Err(CallbackServerError::Config(format!(
                    "Route path must start with '/': {}",
                    path
                )));
            }
        }
        if self.config.callback_path == self.config.api_response_path {
            return Err(CallbackServerError::Config(
                "Callback and API response routes must differ".to_string(),
            ));
        }

        let config = Arc::new(self.config);
        Ok(CallbackServer {
            handler: CallbackHandler::new(Arc::clone(&config), controller),
            config,
        })
    }
}

/// Trigger server
#[derive(Clone)]
pub struct CallbackServer {
    config: Arc<ServerConfig>,
    handler: CallbackHandler,
}

impl CallbackServer {
    pub fn builder() -> CallbackServerBuilder {
        CallbackServerBuilder::new()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Request handler, for driving routes without a socket
    pub fn handler(&self) -> &CallbackHandler {
        &self.handler
    }

    /// Serve until Ctrl-C
    pub async fn run(&self) -> Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Bind the configured address and serve until `shutdown` resolves
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_address).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let local_addr = listener.local_addr()?;
        info!("Callback server listening on {}", local_addr);
        info!("Callback endpoint available at: {}", self.config.callback_path);
        info!("API response endpoint available at: {}", self.config.api_response_path);

        let graceful = GracefulShutdown::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested; no longer accepting connections");
                    break;
                }
                accepted = listener.accept() => {
                    let (stream, peer_addr) = accepted?;
                    debug!("New connection from {}", peer_addr);

                    let handler = self.handler.clone();
                    let service = service_fn(move |req| {
                        let handler = handler.clone();
                        async move { Ok::<_, Infallible>(handler.handle(req).await) }
                    });
                    let connection = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
                    let connection = graceful.watch(connection);

                    tokio::spawn(async move {
                        if let Err(err) = connection.await {
                            // Client disconnects are routine
                            let err_str = err.to_string();
                            if err_str.contains("connection closed before message completed") {
                                debug!("Client disconnected (normal): {}", err);
                            } else {
                                error!("Error serving connection: {}", err);
                            }
                        }
                    });
                }
            }
        }

        tokio::select! {
            _ = graceful.shutdown() => {
                info!("All connections closed");
            }
            _ = tokio::time::sleep(self.config.shutdown_grace) => {
                warn!(grace = ?self.config.shutdown_grace, "Shutdown grace period elapsed with open connections");
            }
        }
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", err);
        std::future::pending::<()>().await;
    }
}
