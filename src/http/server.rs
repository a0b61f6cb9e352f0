//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, timeout, request ID)
//! - Build the shared backend client, health checker and forwarder
//! - Start the sample probe alongside the listener
//! - Serve until the shutdown signal

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use url::Url;

use crate::backend::{BackendStatus, Forwarder, HealthChecker};
use crate::config::{Envelope, GatewayConfig};
use crate::http::handlers;
use crate::http::request::{self, RequestIdGenerator, X_REQUEST_ID};
use crate::observability::{Telemetry, TelemetryError};
use crate::probe::{runner, ProbeRunner, SampleStore};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub health: HealthChecker,
    pub forwarder: Forwarder,
    pub telemetry: Telemetry,
    /// Envelope applied to proxied payloads.
    pub envelope: Envelope,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error("failed to build backend HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid backend endpoint {base}{path}: {source}")]
    Endpoint {
        base: String,
        path: String,
        source: url::ParseError,
    },
}

/// HTTP server for the inference gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
    state: AppState,
}

impl GatewayServer {
    /// Create a new server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, StartupError> {
        let telemetry = Telemetry::new()?;
        let status = Arc::new(BackendStatus::new(telemetry.backend_status_gauge()));

        let client = reqwest::Client::builder()
            .user_agent(concat!("model-gateway/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let backend = &config.backend;
        let health = HealthChecker::new(
            client.clone(),
            endpoint(&backend.base_url, &backend.ping_path)?,
            Duration::from_millis(backend.health_timeout_ms),
            status.clone(),
        );
        let forwarder = Forwarder::new(
            client,
            endpoint(&backend.base_url, &backend.invoke_path)?,
            Duration::from_secs(backend.request_timeout_secs),
            status,
        );

        let state = AppState {
            health,
            forwarder,
            telemetry,
            envelope: backend.envelope,
        };
        let router = Self::build_router(&config, state.clone());

        Ok(Self {
            router,
            config,
            state,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/predict", post(handlers::predict))
            .route("/metrics", get(handlers::metrics))
            .route("/health", get(handlers::health))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, RequestIdGenerator))
                    .layer(TraceLayer::new_for_http().make_span_with(request::make_span))
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.listener.request_timeout_secs,
                    )))
                    .layer(DefaultBodyLimit::max(config.listener.max_body_size)),
            )
    }

    /// Sample probe wired to this server's forwarder and telemetry.
    pub fn probe(&self) -> ProbeRunner {
        ProbeRunner::new(
            SampleStore::new(self.config.probe.sample_path.clone()),
            self.state.forwarder.clone(),
            self.state.telemetry.clone(),
            self.config.probe.envelope,
            Duration::from_secs(self.config.probe.interval_secs),
        )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backend = %self.state.forwarder.invoke_url(),
            "HTTP server starting"
        );

        let probe = if self.config.probe.enabled {
            Some(runner::spawn(self.probe(), shutdown.resubscribe()))
        } else {
            tracing::info!("Sample probe disabled");
            None
        };

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        if let Some(probe) = probe {
            let _ = probe.await;
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.state.telemetry
    }
}

fn endpoint(base: &str, path: &str) -> Result<Url, StartupError> {
    Url::parse(base)
        .and_then(|url| url.join(path))
        .map_err(|source| StartupError::Endpoint {
            base: base.to_string(),
            path: path.to_string(),
            source,
        })
}
