/// Metrics and telemetry for Lodestone
///
/// Provides Prometheus-compatible metrics for monitoring:
/// - HTTP request counts and latencies
/// - Token issuance, validation outcomes and sweeps
/// - Join/hasJoined handshake results
/// - Classified failures by kind

use crate::{error::ErrorKind, token::Validation};
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, Encoder,
    HistogramVec, IntCounter, IntCounterVec, TextEncoder,
};

lazy_static! {
    // ========== HTTP Metrics ==========

    /// Total HTTP requests by method, route, and status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request latencies in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .unwrap();

    // ========== Token Metrics ==========

    pub static ref TOKENS_ISSUED_TOTAL: IntCounter = register_int_counter!(
        "lodestone_tokens_issued_total",
        "Total number of access tokens issued"
    )
    .unwrap();

    /// Expired tokens removed by validation sweeps
    pub static ref TOKENS_SWEPT_TOTAL: IntCounter = register_int_counter!(
        "lodestone_tokens_swept_total",
        "Total number of expired access tokens swept"
    )
    .unwrap();

    pub static ref TOKEN_VALIDATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "lodestone_token_validations_total",
        "Token validations by outcome",
        &["outcome"]
    )
    .unwrap();

    // ========== Session Metrics ==========

    pub static ref HANDSHAKES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "lodestone_handshakes_total",
        "Join and hasJoined calls by result",
        &["phase", "result"]
    )
    .unwrap();

    // ========== Error Metrics ==========

    pub static ref ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "lodestone_errors_total",
        "Failed requests by error kind",
        &["kind"]
    )
    .unwrap();
}

/// Render metrics in Prometheus text format
pub fn render_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration);
}

pub fn record_token_issued() {
    TOKENS_ISSUED_TOTAL.inc();
}

pub fn record_tokens_swept(count: u64) {
    TOKENS_SWEPT_TOTAL.inc_by(count);
}

pub fn record_token_validation(outcome: Validation) {
    TOKEN_VALIDATIONS_TOTAL
        .with_label_values(&[outcome.as_str()])
        .inc();
}

/// Record a join or hasJoined call
pub fn record_handshake(phase: &str, success: bool) {
    HANDSHAKES_TOTAL
        .with_label_values(&[phase, if success { "success" } else { "failure" }])
        .inc();
}

/// Record a classified failure
pub fn record_error(kind: ErrorKind) {
    ERRORS_TOTAL.with_label_values(&[kind.as_str()]).inc();
}
