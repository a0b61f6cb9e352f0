//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use model_gateway::config::GatewayConfig;
use model_gateway::http::GatewayServer;
use model_gateway::lifecycle::Shutdown;
use model_gateway::observability::Telemetry;
use serde_json::Value;
use tokio::net::TcpListener;

type Reply = Box<dyn Fn(&Value) -> (u16, String) + Send + Sync>;

struct Shared {
    healthy: AtomicBool,
    ping_delay_ms: AtomicU64,
    invoke_delay_ms: AtomicU64,
    pings: AtomicUsize,
    invocations: AtomicUsize,
    last_body: Mutex<Option<Value>>,
    reply: Mutex<Reply>,
}

/// In-process stand-in for a model serve endpoint.
#[derive(Clone)]
pub struct MockBackend {
    pub addr: SocketAddr,
    shared: Arc<Shared>,
}

impl MockBackend {
    /// Start a backend answering every invocation with `status` and `body`.
    pub async fn start(status: u16, body: &str) -> Self {
        let body = body.to_string();
        Self::start_with(move |_: &Value| (status, body.clone())).await
    }

    /// Start a backend whose invocation reply is computed from the request.
    pub async fn start_with<F>(reply: F) -> Self
    where
        F: Fn(&Value) -> (u16, String) + Send + Sync + 'static,
    {
        let shared = Arc::new(Shared {
            healthy: AtomicBool::new(true),
            ping_delay_ms: AtomicU64::new(0),
            invoke_delay_ms: AtomicU64::new(0),
            pings: AtomicUsize::new(0),
            invocations: AtomicUsize::new(0),
            last_body: Mutex::new(None),
            reply: Mutex::new(Box::new(reply) as Reply),
        });

        let app = Router::new()
            .route("/ping", get(ping))
            .route("/invocations", post(invoke))
            .with_state(shared.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, shared }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.shared.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Make `/ping` wait this long before answering.
    pub fn set_ping_delay(&self, delay: Duration) {
        self.shared
            .ping_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Make `/invocations` wait this long before answering.
    pub fn set_invoke_delay(&self, delay: Duration) {
        self.shared
            .invoke_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn set_reply(&self, status: u16, body: &str) {
        let body = body.to_string();
        *self.shared.reply.lock().unwrap() = Box::new(move |_: &Value| (status, body.clone()));
    }

    pub fn pings(&self) -> usize {
        self.shared.pings.load(Ordering::SeqCst)
    }

    pub fn invocations(&self) -> usize {
        self.shared.invocations.load(Ordering::SeqCst)
    }

    pub fn last_body(&self) -> Option<Value> {
        self.shared.last_body.lock().unwrap().clone()
    }
}

async fn ping(State(shared): State<Arc<Shared>>) -> StatusCode {
    shared.pings.fetch_add(1, Ordering::SeqCst);
    delay(&shared.ping_delay_ms).await;
    if shared.healthy.load(Ordering::SeqCst) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn invoke(State(shared): State<Arc<Shared>>, Json(body): Json<Value>) -> impl IntoResponse {
    shared.invocations.fetch_add(1, Ordering::SeqCst);
    delay(&shared.invoke_delay_ms).await;
    let (status, reply) = {
        let reply_fn = shared.reply.lock().unwrap();
        (*reply_fn)(&body)
    };
    *shared.last_body.lock().unwrap() = Some(body);
    (
        StatusCode::from_u16(status).unwrap(),
        [(header::CONTENT_TYPE, "application/json")],
        reply,
    )
}

async fn delay(ms: &AtomicU64) {
    let ms = ms.load(Ordering::SeqCst);
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

/// Value of the first sample line for `series` (a metric name, optionally with labels).
pub fn sample_value(rendered: &str, series: &str) -> Option<f64> {
    rendered.lines().find_map(|line| {
        let rest = line.strip_prefix(series)?;
        let value = rest.strip_prefix(' ')?;
        value.trim().parse().ok()
    })
}

/// Base URL of a port with nothing listening on it.
pub async fn dead_backend_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Gateway config pointed at `backend_url`, probe disabled.
pub fn gateway_config(backend_url: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.backend.base_url = backend_url.to_string();
    config.backend.request_timeout_secs = 5;
    config.probe.enabled = false;
    config
}

/// A running gateway bound to an ephemeral port.
pub struct Gateway {
    pub addr: SocketAddr,
    pub telemetry: Telemetry,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl Gateway {
    pub async fn start(config: GatewayConfig) -> Self {
        let server = GatewayServer::new(config).unwrap();
        let telemetry = server.telemetry().clone();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let shutdown = Shutdown::new();
        let server_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, server_shutdown).await;
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap();

        Self {
            addr,
            telemetry,
            client,
            shutdown,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn metric(&self, series: &str) -> Option<f64> {
        sample_value(&self.telemetry.render(), series)
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}
