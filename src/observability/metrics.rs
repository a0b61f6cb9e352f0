//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway and probe metrics
//! - Render a Prometheus text snapshot for `GET /metrics`
//!
//! # Metrics
//! - `ml_model_predictions_total` (counter): successful proxied predictions
//! - `ml_model_prediction_duration_seconds` (histogram): backend call latency
//! - `model_serve_status` (gauge): 1=reachable, 0=unreachable
//! - `ml_model_last_prediction_value` (gauge): last probe prediction
//! - `ml_exporter_prediction_latency_ms` (gauge): last probe latency
//! - `ml_exporter_probe_failures_total` (counter): failed probe ticks by reason
//! - `ml_model_normalization_failures_total` (counter): unrecognized response shapes
//! - `gateway_requests_total` (counter): handled requests by endpoint, status
//!
//! # Design Decisions
//! - The recorder is owned by `Telemetry` and never installed globally, so
//!   each server instance (and each test) gets an isolated registry
//! - Handles are registered once and updated with atomic operations
//! - Probe gauges are registered on first write so they stay absent until set

use std::sync::Arc;
use std::time::Duration;

use metrics::{Counter, Gauge, Histogram, Key, KeyName, Label, Level, Metadata, Recorder};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use thiserror::Error;

pub const PREDICTIONS_TOTAL: &str = "ml_model_predictions_total";
pub const PREDICTION_DURATION: &str = "ml_model_prediction_duration_seconds";
pub const BACKEND_STATUS: &str = "model_serve_status";
pub const LAST_SAMPLE_PREDICTION: &str = "ml_model_last_prediction_value";
pub const PROBE_LATENCY: &str = "ml_exporter_prediction_latency_ms";
pub const PROBE_FAILURES: &str = "ml_exporter_probe_failures_total";
pub const NORMALIZATION_FAILURES: &str = "ml_model_normalization_failures_total";
pub const REQUESTS_TOTAL: &str = "gateway_requests_total";

/// 1ms to 10s; the exporter appends the `+Inf` overflow bucket.
pub const DURATION_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to build metrics recorder: {0}")]
    Build(#[from] BuildError),
}

/// Process-wide metrics registry, cheap to clone.
#[derive(Clone)]
pub struct Telemetry {
    inner: Arc<Inner>,
}

struct Inner {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
    predictions_total: Counter,
    prediction_duration: Histogram,
    backend_status: Gauge,
    normalization_failures: Counter,
}

fn metadata() -> Metadata<'static> {
    Metadata::new(module_path!(), Level::INFO, Some(module_path!()))
}

impl Telemetry {
    pub fn new() -> Result<Self, TelemetryError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(Matcher::Full(PREDICTION_DURATION.to_string()), DURATION_BUCKETS)?
            .build_recorder();
        describe(&recorder);

        let handle = recorder.handle();
        let meta = metadata();
        let predictions_total =
            recorder.register_counter(&Key::from_static_name(PREDICTIONS_TOTAL), &meta);
        let prediction_duration =
            recorder.register_histogram(&Key::from_static_name(PREDICTION_DURATION), &meta);
        let backend_status = recorder.register_gauge(&Key::from_static_name(BACKEND_STATUS), &meta);
        let normalization_failures =
            recorder.register_counter(&Key::from_static_name(NORMALIZATION_FAILURES), &meta);
        backend_status.set(0.0);

        Ok(Self {
            inner: Arc::new(Inner {
                recorder,
                handle,
                predictions_total,
                prediction_duration,
                backend_status,
                normalization_failures,
            }),
        })
    }

    /// Gauge mirroring backend reachability.
    pub fn backend_status_gauge(&self) -> Gauge {
        self.inner.backend_status.clone()
    }

    /// Count one successful prediction and observe its backend latency.
    pub fn record_prediction(&self, latency: Duration) {
        self.inner.predictions_total.increment(1);
        self.inner.prediction_duration.record(latency.as_secs_f64());
    }

    /// Count a backend response whose shape could not be normalized.
    pub fn record_normalization_failure(&self) {
        self.inner.normalization_failures.increment(1);
    }

    /// Publish a successful probe result.
    pub fn record_sample_prediction(&self, value: f64, latency: Duration) {
        let meta = metadata();
        self.inner
            .recorder
            .register_gauge(&Key::from_static_name(LAST_SAMPLE_PREDICTION), &meta)
            .set(value);
        self.inner
            .recorder
            .register_gauge(&Key::from_static_name(PROBE_LATENCY), &meta)
            .set(latency.as_secs_f64() * 1000.0);
    }

    /// Count a failed probe tick.
    pub fn record_probe_failure(&self, reason: &'static str) {
        let key = Key::from_parts(PROBE_FAILURES, vec![Label::new("reason", reason)]);
        self.inner.recorder.register_counter(&key, &metadata()).increment(1);
    }

    /// Count a handled inbound request.
    pub fn record_request(&self, endpoint: &'static str, status: u16) {
        let key = Key::from_parts(
            REQUESTS_TOTAL,
            vec![
                Label::new("endpoint", endpoint),
                Label::new("status", status.to_string()),
            ],
        );
        self.inner.recorder.register_counter(&key, &metadata()).increment(1);
    }

    /// Prometheus text exposition of every registered metric.
    pub fn render(&self) -> String {
        self.inner.handle.render()
    }
}

fn describe(recorder: &PrometheusRecorder) {
    recorder.describe_counter(
        KeyName::from_const_str(PREDICTIONS_TOTAL),
        None,
        "Total number of predictions made by the ML model.".into(),
    );
    recorder.describe_histogram(
        KeyName::from_const_str(PREDICTION_DURATION),
        None,
        "Histogram of prediction duration in seconds.".into(),
    );
    recorder.describe_gauge(
        KeyName::from_const_str(BACKEND_STATUS),
        None,
        "Whether the model serve endpoint is reachable (1) or not (0).".into(),
    );
    recorder.describe_gauge(
        KeyName::from_const_str(LAST_SAMPLE_PREDICTION),
        None,
        "Last prediction value for the fixed sample input.".into(),
    );
    recorder.describe_gauge(
        KeyName::from_const_str(PROBE_LATENCY),
        None,
        "Inference latency observed by the sample probe, in milliseconds.".into(),
    );
    recorder.describe_counter(
        KeyName::from_const_str(PROBE_FAILURES),
        None,
        "Failed sample probe ticks by reason.".into(),
    );
    recorder.describe_counter(
        KeyName::from_const_str(NORMALIZATION_FAILURES),
        None,
        "Backend responses whose shape could not be reduced to a scalar.".into(),
    );
    recorder.describe_counter(
        KeyName::from_const_str(REQUESTS_TOTAL),
        None,
        "Inbound requests by endpoint and status.".into(),
    );
}
