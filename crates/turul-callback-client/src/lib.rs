//! # Orchestrator Client
//!
//! A minimal JSON client for the pipeline orchestrator's distributed-task REST
//! surface. It is used by the reporting channels to patch timeline records,
//! write job variables, post plan events and append to the job log feed.
//!
//! ## Features
//!
//! - **Per-call credentials**: each request carries its own Bearer or Basic header
//! - **Non-fatal HTTP failures**: non-2xx answers come back as [`ApiResponse`] values
//! - **Shared connection pool**: one `reqwest::Client` for all invocations
//! - **Endpoint builder**: every URL derived from a [`CorrelationContext`](turul_callback_protocol::CorrelationContext)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use turul_callback_client::{
//!     ClientConfig, Credential, HttpOrchestratorClient, OrchestratorApi, OrchestratorEndpoints,
//!     RequestBody,
//! };
//! use turul_callback_protocol::{CorrelationContext, TaskOutcome, encoder};
//!
//! # async fn example(ctx: CorrelationContext) -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::default();
//! let client = HttpOrchestratorClient::new(&config)?;
//! let endpoints = OrchestratorEndpoints::new(&ctx, &config.api_versions)?;
//!
//! let outcome = TaskOutcome::succeeded("done");
//! let body = encoder::encode_timeline_record_patch(&ctx.task_instance_id, &outcome)?;
//!
//! let response = client
//!     .patch(endpoints.records(), &RequestBody::json(body), &Credential::bearer(&ctx.auth_token))
//!     .await?;
//! println!("records PATCH -> {}", response.status);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod credential;
pub mod endpoints;
pub mod error;
pub mod http;

// Re-export main types
pub use api::{ApiMethod, ApiResponse, OrchestratorApi, RequestBody};
pub use config::{ApiVersions, ClientConfig, ConnectionConfig, TimeoutConfig};
pub use credential::{AuthScheme, Credential};
pub use endpoints::OrchestratorEndpoints;
pub use error::{ClientError, ClientResult};
pub use http::HttpOrchestratorClient;
