//! Startup orchestration.

use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::http::GatewayServer;
use crate::lifecycle::{signals, Shutdown};

/// Bind, build and serve until SIGINT/SIGTERM.
pub async fn run(config: GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        backend = %config.backend.base_url,
        probe_enabled = config.probe.enabled,
        probe_interval_secs = config.probe.interval_secs,
        "Listening for connections"
    );

    let server = GatewayServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::terminate().await;
        trigger.trigger();
    });

    server.run(listener, server_shutdown).await?;
    Ok(())
}
