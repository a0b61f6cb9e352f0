//! Inference gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                   ┌──────────────────────────────────────────────┐
//!                   │                 MODEL GATEWAY                 │
//!   POST /predict   │  ┌────────┐   ┌────────┐   ┌───────────┐      │
//!  ─────────────────┼─▶│  http  │──▶│ health │──▶│ forwarder │──────┼──▶ Model
//!                   │  │handlers│   │  gate  │   │  (timed)  │      │    serve
//!  ◀────────────────┼──│        │◀──┴────────┴───│           │◀─────┼───
//!                   │  └───┬────┘                └─────┬─────┘      │
//!   GET /metrics    │      │        ┌──────────┐       │            │
//!  ─────────────────┼──────┴───────▶│telemetry │◀──────┤            │
//!                   │               └──────────┘       │            │
//!                   │               ┌──────────┐       │            │
//!                   │               │  probe   │───────┘            │
//!                   │               │ (15s)    │                    │
//!                   │               └──────────┘                    │
//!                   └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use model_gateway::config;
use model_gateway::lifecycle::startup;
use model_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "model-gateway", version, about = "Health-gated inference gateway")]
struct Args {
    /// Optional TOML configuration file.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = config::load(args.config.as_deref())?;

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "model-gateway starting");

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
