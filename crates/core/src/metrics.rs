//! Prometheus metrics for the job orchestrator.
//!
//! This module provides metrics for:
//! - Job lifecycle (starts, outcomes, duration)
//! - Passcode handling (wait time, submissions)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Job Metrics
// =============================================================================

/// Jobs started total.
pub static JOBS_STARTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("oabrief_jobs_started_total", "Total jobs started").unwrap()
});

/// Start requests rejected because a job was already running.
pub static JOB_CONFLICTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "oabrief_job_conflicts_total",
        "Start requests rejected while a job was running",
    )
    .unwrap()
});

/// Finished jobs by outcome.
pub static JOB_OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("oabrief_job_outcomes_total", "Finished jobs by outcome"),
        &["result"], // "done", "timeout", "stage_error"
    )
    .unwrap()
});

/// Job duration in seconds, from start to terminal status.
pub static JOB_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("oabrief_job_duration_seconds", "Duration of a job run")
            .buckets(vec![1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
        &["result"],
    )
    .unwrap()
});

// =============================================================================
// Passcode Metrics
// =============================================================================

/// Time spent waiting for a human to submit the passcode.
pub static OTP_WAIT_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "oabrief_otp_wait_seconds",
            "Time spent waiting for the one-time passcode",
        )
        .buckets(vec![1.0, 5.0, 10.0, 20.0, 30.0, 45.0, 60.0]),
        &["result"], // "received", "gave_up"
    )
    .unwrap()
});

/// Passcode submissions by result.
pub static OTP_SUBMISSIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("oabrief_otp_submissions_total", "Passcode submissions"),
        &["result"], // "accepted", "rejected"
    )
    .unwrap()
});

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(JOBS_STARTED.clone()),
        Box::new(JOB_CONFLICTS.clone()),
        Box::new(JOB_OUTCOMES.clone()),
        Box::new(JOB_DURATION.clone()),
        Box::new(OTP_WAIT_DURATION.clone()),
        Box::new(OTP_SUBMISSIONS.clone()),
    ]
}
