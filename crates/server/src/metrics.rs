//! Prometheus metrics
//!
//! Per-turn stage latencies come from the session snapshot and are recorded
//! when the client polls state, which it does once per turn.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

use voice_dialogue_agent::TurnMetrics;

static PROMETHEUS: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder and register metric descriptions
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    describe_counter!("dialogue_requests_total", "HTTP requests by endpoint");
    describe_counter!("dialogue_errors_total", "Server errors by kind");
    describe_counter!("dialogue_sessions_created_total", "Sessions created");
    describe_histogram!(
        "dialogue_recognition_latency_ms",
        "Speech recognition latency per turn"
    );
    describe_histogram!(
        "dialogue_reasoning_latency_ms",
        "Reasoning engine latency per turn"
    );
    describe_histogram!(
        "dialogue_synthesis_latency_ms",
        "Speech synthesis latency per turn"
    );

    let _ = PROMETHEUS.set(handle.clone());
    Ok(handle)
}

pub fn record_request(endpoint: &'static str) {
    counter!("dialogue_requests_total", "endpoint" => endpoint).increment(1);
}

pub fn record_error(kind: &'static str) {
    counter!("dialogue_errors_total", "kind" => kind).increment(1);
}

pub fn record_session_created() {
    counter!("dialogue_sessions_created_total").increment(1);
}

/// Record the last turn's stage latencies
pub fn record_turn_latencies(metrics: &TurnMetrics) {
    histogram!("dialogue_recognition_latency_ms").record(metrics.recognition_ms as f64);
    histogram!("dialogue_reasoning_latency_ms").record(metrics.reasoning_ms as f64);
    histogram!("dialogue_synthesis_latency_ms").record(metrics.synthesis_ms as f64);
}

/// Render the Prometheus exposition text
pub async fn metrics_handler() -> String {
    PROMETHEUS.get().map(|h| h.render()).unwrap_or_default()
}
