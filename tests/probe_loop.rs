//! Sample probe tests.

use std::path::PathBuf;
use std::time::Duration;

use model_gateway::config::GatewayConfig;
use model_gateway::http::GatewayServer;
use model_gateway::lifecycle::Shutdown;
use model_gateway::probe::ProbeError;
use serde_json::json;

mod common;
use common::{gateway_config, sample_value, MockBackend};

const LAST_VALUE: &str = "ml_model_last_prediction_value";
const PROBE_LATENCY: &str = "ml_exporter_prediction_latency_ms";

fn sample_path() -> PathBuf {
    std::env::temp_dir().join(format!("probe-sample-{}.json", uuid::Uuid::new_v4()))
}

fn write_sample(path: &PathBuf) {
    std::fs::write(path, r#"[{"total_sqft": 1000.0, "bath": 2.0, "bhk": 3.0}]"#).unwrap();
}

fn probe_config(backend: &MockBackend, sample: &PathBuf) -> GatewayConfig {
    let mut config = gateway_config(&backend.base_url());
    config.probe.sample_path = sample.clone();
    config
}

#[tokio::test]
async fn test_tick_publishes_sample_prediction() {
    let backend = MockBackend::start(200, r#"{"predictions":[55.4]}"#).await;
    let sample = sample_path();
    write_sample(&sample);

    let server = GatewayServer::new(probe_config(&backend, &sample)).unwrap();
    let report = server.probe().tick().await.unwrap();

    assert_eq!(report.prediction, 55.4);
    assert_eq!(
        backend.last_body(),
        Some(json!({"inputs": [{"total_sqft": 1000.0, "bath": 2.0, "bhk": 3.0}]}))
    );
    assert_eq!(backend.pings(), 0);

    let text = server.telemetry().render();
    assert_eq!(sample_value(&text, LAST_VALUE), Some(55.4));
    assert!(sample_value(&text, PROBE_LATENCY).unwrap() >= 0.0);
    assert_eq!(sample_value(&text, "model_serve_status"), Some(1.0));
    assert_eq!(sample_value(&text, "ml_model_predictions_total").unwrap_or(0.0), 0.0);

    std::fs::remove_file(sample).unwrap();
}

#[tokio::test]
async fn test_missing_sample_is_a_load_failure_and_recovers() {
    let backend = MockBackend::start(200, "[7.2]").await;
    let sample = sample_path();

    let server = GatewayServer::new(probe_config(&backend, &sample)).unwrap();
    let probe = server.probe();

    let err = probe.tick().await.unwrap_err();
    assert!(matches!(err, ProbeError::SampleLoad(_)));
    assert_eq!(backend.invocations(), 0);

    let text = server.telemetry().render();
    assert_eq!(sample_value(&text, LAST_VALUE), None);
    assert_eq!(
        sample_value(&text, "ml_exporter_probe_failures_total{reason=\"sample_load\"}"),
        Some(1.0)
    );

    write_sample(&sample);
    let report = probe.tick().await.unwrap();
    assert_eq!(report.prediction, 7.2);
    assert_eq!(sample_value(&server.telemetry().render(), LAST_VALUE), Some(7.2));

    std::fs::remove_file(sample).unwrap();
}

#[tokio::test]
async fn test_failed_tick_keeps_previous_gauges() {
    let backend = MockBackend::start(200, "[55.4]").await;
    let sample = sample_path();
    write_sample(&sample);

    let server = GatewayServer::new(probe_config(&backend, &sample)).unwrap();
    let probe = server.probe();
    probe.tick().await.unwrap();

    backend.set_reply(500, "model crashed");
    let err = probe.tick().await.unwrap_err();
    assert!(matches!(err, ProbeError::Backend(_)));

    let text = server.telemetry().render();
    assert_eq!(sample_value(&text, LAST_VALUE), Some(55.4));
    assert_eq!(sample_value(&text, "model_serve_status"), Some(0.0));
    assert_eq!(
        sample_value(&text, "ml_exporter_probe_failures_total{reason=\"backend\"}"),
        Some(1.0)
    );

    backend.set_reply(200, r#"{"unexpected": true}"#);
    let err = probe.tick().await.unwrap_err();
    assert!(matches!(err, ProbeError::Normalization(_)));
    assert_eq!(sample_value(&server.telemetry().render(), LAST_VALUE), Some(55.4));

    std::fs::remove_file(sample).unwrap();
}

#[tokio::test]
async fn test_loop_survives_failures_until_shutdown() {
    let backend = MockBackend::start(200, "[1.0]").await;
    let sample = sample_path();

    let mut config = probe_config(&backend, &sample);
    config.probe.interval_secs = 1;
    let server = GatewayServer::new(config).unwrap();
    let telemetry = server.telemetry().clone();

    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.probe().run(shutdown.subscribe()));

    tokio::time::sleep(Duration::from_millis(1500)).await;
    let failures = sample_value(
        &telemetry.render(),
        "ml_exporter_probe_failures_total{reason=\"sample_load\"}",
    )
    .unwrap();
    assert!(failures >= 2.0, "expected at least two failed ticks, got {failures}");
    assert!(!handle.is_finished());

    write_sample(&sample);
    tokio::time::sleep(Duration::from_millis(1200)).await;
    assert_eq!(sample_value(&telemetry.render(), LAST_VALUE), Some(1.0));

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("probe loop did not stop")
        .unwrap();

    std::fs::remove_file(sample).unwrap();
}

#[tokio::test]
async fn test_shutdown_interrupts_in_flight_tick() {
    let backend = MockBackend::start(200, "[1.0]").await;
    backend.set_invoke_delay(Duration::from_secs(3));
    let sample = sample_path();
    write_sample(&sample);

    let mut config = probe_config(&backend, &sample);
    config.probe.interval_secs = 1;
    let server = GatewayServer::new(config).unwrap();
    let telemetry = server.telemetry().clone();

    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.probe().run(shutdown.subscribe()));

    // First tick fires immediately and is now waiting on the slow backend.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(backend.invocations(), 1);

    let started = std::time::Instant::now();
    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("loop waited for the in-flight tick")
        .unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(sample_value(&telemetry.render(), LAST_VALUE), None);

    std::fs::remove_file(sample).unwrap();
}
