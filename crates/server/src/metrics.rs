//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the server:
//! - HTTP request metrics (latency, counts)
//! - Current job status (collected dynamically)
//! - Core job and passcode metrics

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};
use oabrief_core::JobStatus;
use tracing::error;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "oabrief_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("oabrief_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "oabrief_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Job Metrics
// =============================================================================

/// 1 for the current job status, 0 for the others.
pub static JOB_STATUS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("oabrief_job_status", "Current job status"),
        &["status"],
    )
    .unwrap()
});

/// Whether a job is running.
pub static JOB_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("oabrief_job_active", "Whether a job is currently running").unwrap()
});

const ALL_STATUSES: [JobStatus; 5] = [
    JobStatus::Idle,
    JobStatus::Processing,
    JobStatus::WaitingOtp,
    JobStatus::Done,
    JobStatus::Error,
];

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Job
    registry.register(Box::new(JOB_STATUS.clone())).unwrap();
    registry.register(Box::new(JOB_ACTIVE.clone())).unwrap();

    // Core metrics (jobs, passcodes)
    for metric in oabrief_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so the gauges reflect the job as it is now.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let orchestrator = state.orchestrator();
    let current = orchestrator.status().status;
    for status in ALL_STATUSES {
        JOB_STATUS
            .with_label_values(&[status.as_str()])
            .set(i64::from(status == current));
    }
    JOB_ACTIVE.set(i64::from(orchestrator.is_active()));
}

/// Normalize a path for metric labels.
///
/// Dashboard files are collapsed into one label so arbitrary URLs can't
/// blow up label cardinality.
pub fn normalize_path(path: &str) -> String {
    if path.starts_with("/api/") || path == "/metrics" {
        path.to_string()
    } else {
        "{static}".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_api() {
        assert_eq!(normalize_path("/api/status"), "/api/status");
        assert_eq!(normalize_path("/metrics"), "/metrics");
    }

    #[test]
    fn test_normalize_path_static() {
        assert_eq!(normalize_path("/"), "{static}");
        assert_eq!(normalize_path("/assets/app.js"), "{static}");
        assert_eq!(normalize_path("/apix"), "{static}");
    }

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("oabrief_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_registry_contains_all_metrics() {
        HTTP_REQUEST_DURATION
            .with_label_values(&["GET", "/test", "200"])
            .observe(0.1);
        HTTP_REQUESTS_IN_FLIGHT.set(0);
        JOB_STATUS.with_label_values(&["idle"]).set(1);
        JOB_ACTIVE.set(0);
        oabrief_core::metrics::JOBS_STARTED.inc();

        let output = encode_metrics();

        assert!(output.contains("oabrief_http_request_duration_seconds"));
        assert!(output.contains("oabrief_http_requests_in_flight"));
        assert!(output.contains("oabrief_job_status"));
        assert!(output.contains("oabrief_job_active"));
        assert!(output.contains("oabrief_jobs_started_total"));
    }
}
