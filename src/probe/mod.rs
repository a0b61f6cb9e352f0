//! Sample probe subsystem.
//!
//! # Data Flow
//! ```text
//! Ticker (every interval)
//!     → sample.rs (load fixed input once, reload after failure)
//!     → backend::Forwarder (same path as live traffic)
//!     → observability::Telemetry (last value + latency gauges)
//! ```
//!
//! # Design Decisions
//! - Runs independently of inbound traffic
//! - A failed tick is logged and counted, never fatal
//! - Load failures are reported separately from backend failures

pub mod runner;
pub mod sample;

pub use runner::{ProbeError, ProbeReport, ProbeRunner};
pub use sample::{SampleInput, SampleLoadError, SampleStore};
