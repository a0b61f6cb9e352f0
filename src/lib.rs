//! Health-gated inference gateway.
//!
//! Proxies prediction requests to an external model-scoring server,
//! gates each one on a backend health check, and exposes Prometheus
//! metrics. A background probe scores a fixed sample on an interval.

pub mod backend;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod probe;

pub use config::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
