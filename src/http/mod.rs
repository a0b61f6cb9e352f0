//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, shared state)
//!     → request.rs (request ID, trace span)
//!     → handlers.rs (/predict, /metrics, /health)
//!     → error.rs (error kind → status + JSON body)
//!     → Send to client
//! ```

pub mod error;
pub mod handlers;
pub mod request;
pub mod server;

pub use error::ApiError;
pub use request::{RequestIdGenerator, X_REQUEST_ID};
pub use server::{AppState, GatewayServer, StartupError};
