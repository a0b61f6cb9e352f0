//! Periodic sample probe.
//!
//! # Responsibilities
//! - Send the fixed sample to the backend on every tick
//! - Publish the normalized prediction and latency as gauges
//! - Keep going no matter how a tick fails
//!
//! # Design Decisions
//! - First tick fires immediately; missed ticks are delayed, not bunched
//! - On failure gauges keep their previous values
//! - Backend failures flip `BackendStatus` through the forwarder itself

use std::time::Duration;

use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::backend::{ForwardError, Forwarder, NormalizeError};
use crate::config::Envelope;
use crate::observability::Telemetry;
use crate::probe::sample::{SampleLoadError, SampleStore};

/// Outcome of a successful tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeReport {
    pub prediction: f64,
    pub latency: Duration,
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(transparent)]
    SampleLoad(#[from] SampleLoadError),

    #[error(transparent)]
    Backend(#[from] ForwardError),

    #[error("could not read prediction from response: {0}")]
    Normalization(#[from] NormalizeError),
}

impl ProbeError {
    /// Metric label for this failure.
    pub fn reason(&self) -> &'static str {
        match self {
            ProbeError::SampleLoad(_) => "sample_load",
            ProbeError::Backend(_) => "backend",
            ProbeError::Normalization(_) => "normalization",
        }
    }
}

pub struct ProbeRunner {
    store: SampleStore,
    forwarder: Forwarder,
    telemetry: Telemetry,
    envelope: Envelope,
    interval: Duration,
}

impl ProbeRunner {
    pub fn new(
        store: SampleStore,
        forwarder: Forwarder,
        telemetry: Telemetry,
        envelope: Envelope,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            forwarder,
            telemetry,
            envelope,
            interval,
        }
    }

    /// Tick until a shutdown signal arrives.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs_f64(),
            sample = %self.store.path().display(),
            url = %self.forwarder.invoke_url(),
            "Sample probe starting"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.recv() => break,
            }
            // An in-flight tick is dropped on shutdown rather than awaited.
            tokio::select! {
                _ = self.tick() => {}
                _ = shutdown.recv() => break,
            }
        }
        tracing::info!("Sample probe received shutdown signal, exiting loop");
    }

    /// Run a single probe attempt and record its outcome.
    pub async fn tick(&self) -> Result<ProbeReport, ProbeError> {
        let result = self.attempt().await;
        match &result {
            Ok(report) => {
                self.telemetry
                    .record_sample_prediction(report.prediction, report.latency);
                tracing::info!(
                    prediction = report.prediction,
                    latency_ms = report.latency.as_secs_f64() * 1000.0,
                    "Sample prediction recorded"
                );
            }
            Err(e) => {
                self.telemetry.record_probe_failure(e.reason());
                match e {
                    ProbeError::SampleLoad(_) => {
                        tracing::error!(reason = e.reason(), error = %e, "Sample probe could not load its input")
                    }
                    _ => tracing::warn!(reason = e.reason(), error = %e, "Sample probe failed"),
                }
            }
        }
        result
    }

    async fn attempt(&self) -> Result<ProbeReport, ProbeError> {
        let sample = self.store.get().await?;
        let forwarded = self
            .forwarder
            .forward(&sample.to_payload(), self.envelope)
            .await?;
        let prediction = forwarded.prediction()?;
        Ok(ProbeReport {
            prediction,
            latency: forwarded.latency,
        })
    }
}

/// Spawn the probe on its own task.
pub fn spawn(runner: ProbeRunner, shutdown: broadcast::Receiver<()>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(runner.run(shutdown))
}
