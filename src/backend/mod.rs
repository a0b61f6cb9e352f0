//! Model-scoring backend subsystem.
//!
//! # Data Flow
//! ```text
//! Proxy handler / probe loop
//!     → health.rs (GET ping, short timeout)       ─┐
//!     → forwarder.rs (POST invoke, timed)          ├→ status.rs (BackendStatus)
//!         → normalize.rs (response → scalar)      ─┘
//!         → error.rs (Unreachable | Rejected | Unexpected)
//! ```
//!
//! # Design Decisions
//! - One pooled HTTP client shared by health checks, forwards and the probe
//! - Every outbound call has a deadline
//! - Errors are classified at the network call; nothing raw escapes
//! - No retries: one attempt per request or tick

pub mod error;
pub mod forwarder;
pub mod health;
pub mod normalize;
pub mod status;

pub use error::ForwardError;
pub use forwarder::{Forwarded, Forwarder};
pub use health::HealthChecker;
pub use normalize::{normalize, NormalizeError};
pub use status::BackendStatus;

/// Cap on response text carried in errors and logs.
pub(crate) const MAX_LOGGED_BODY: usize = 512;

/// Truncate `text` to at most `MAX_LOGGED_BODY` bytes on a char boundary.
pub(crate) fn truncate_body(text: &str) -> &str {
    if text.len() <= MAX_LOGGED_BODY {
        return text;
    }
    let mut end = MAX_LOGGED_BODY;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
