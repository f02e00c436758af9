//! # Callback Function Host
//!
//! Serves the deferred task callback trigger. A pipeline task calls
//! `/api/FunctionCallback` with its correlation headers; the host acknowledges
//! immediately, runs simulated work, and reports the outcome back to the
//! orchestrator through every configured channel.
//!
//! ## Usage
//! ```bash
//! cargo run --package callback-function -- --bind 0.0.0.0:7071 --work-secs 5
//! ```
//!
//! ## Trigger With Curl
//! ```bash
//! curl -X POST http://127.0.0.1:7071/api/FunctionCallback \
//!   -H "PlanUrl: https://dev.azure.com/org/" -H "ProjectId: <project>" \
//!   -H "HubName: build" -H "PlanId: <plan>" -H "JobId: <job>" \
//!   -H "TimelineId: <timeline>" -H "TaskInstanceId: <task>" \
//!   -H "AuthToken: <token>" -d '{"hello": "world"}'
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use turul_callback_protocol::ValidationPolicy;
use turul_callback_reporter::{CallbackController, ReporterConfig};
use turul_callback_server::CallbackServer;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(short, long, env = "CALLBACK_BIND", default_value = "127.0.0.1:7071")]
    bind: SocketAddr,

    /// JSON reporter configuration file
    #[arg(short, long, env = "CALLBACK_CONFIG")]
    config: Option<PathBuf>,

    /// Simulated work duration in seconds (overrides the config file)
    #[arg(long, env = "CALLBACK_WORK_SECS")]
    work_secs: Option<u64>,

    /// Progress ticks reported during simulated work (overrides the config file)
    #[arg(long, env = "CALLBACK_PROGRESS_TICKS")]
    progress_ticks: Option<u32>,

    /// Only require PlanUrl, TaskInstanceId and AuthToken
    #[arg(long, env = "CALLBACK_MINIMAL_HEADERS")]
    minimal_headers: bool,

    /// Disable CORS headers
    #[arg(long)]
    no_cors: bool,

    /// Maximum request body size in bytes
    #[arg(long, env = "CALLBACK_MAX_BODY", default_value = "1048576")]
    max_body_size: usize,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(args: &Args) -> Result<ReporterConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            ReporterConfig::from_json(&raw)
                .with_context(|| format!("Invalid config file {}", path.display()))?
        }
        None => ReporterConfig::default(),
    };

    if let Some(secs) = args.work_secs {
        config.work.duration = Duration::from_secs(secs);
    }
    if let Some(ticks) = args.progress_ticks {
        config.work.progress_ticks = ticks;
    }
    if args.minimal_headers {
        config.validation = ValidationPolicy::Minimal;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = load_config(&args)?;
    info!("Callback function host starting");
    info!(
        "   • Header validation: {:?}, simulated work: {:?} in {} ticks",
        config.validation, config.work.duration, config.work.progress_ticks
    );
    info!("   • Reporter config: {}", serde_json::to_string(&config)?);

    let controller = CallbackController::builder()
        .config(config)
        .build()
        .context("Failed to build callback controller")?;
    info!("   • Reporting channels: {:?}", controller.channel_names());

    let server = CallbackServer::builder()
        .bind_address(args.bind)
        .cors(!args.no_cors)
        .max_body_size(args.max_body_size)
        .controller(Arc::new(controller))
        .build()?;

    server.run().await?;
    info!("Callback function host stopped");
    Ok(())
}
