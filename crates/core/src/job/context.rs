//! Handle given to pipeline stages for reporting back to the orchestrator.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};
use uuid::Uuid;

use super::gate::{GateError, OtpGate};
use super::state::JobState;
use super::types::{JobSnapshot, JobStatus};
use crate::metrics::OTP_WAIT_DURATION;

const WAITING_OTP_MESSAGE: &str = "waiting for one-time passcode";

/// Per-job view of the shared state and the job's passcode gate.
#[derive(Debug, Clone)]
pub struct JobContext {
    job_id: Uuid,
    state: Arc<JobState>,
    gate: Arc<OtpGate>,
    otp_timeout: Duration,
}

impl JobContext {
    pub fn new(state: Arc<JobState>, gate: Arc<OtpGate>, otp_timeout: Duration) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            state,
            gate,
            otp_timeout,
        }
    }

    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub fn otp_timeout(&self) -> Duration {
        self.otp_timeout
    }

    /// Publish a progress message while staying in `processing`.
    pub fn progress(&self, message: impl Into<String>) -> JobSnapshot {
        self.state.update(JobStatus::Processing, message)
    }

    /// Switch to `waiting_otp` and block until a passcode arrives or the
    /// deadline passes.
    pub async fn request_otp(&self) -> Result<String, GateError> {
        self.state.update(JobStatus::WaitingOtp, WAITING_OTP_MESSAGE);
        info!(
            "Job {} waiting up to {}s for passcode",
            self.job_id,
            self.otp_timeout.as_secs()
        );

        let started = Instant::now();
        let result = self.gate.wait(self.otp_timeout).await;
        let elapsed = started.elapsed().as_secs_f64();

        match &result {
            Ok(_) => {
                OTP_WAIT_DURATION.with_label_values(&["received"]).observe(elapsed);
                info!("Job {} received passcode", self.job_id);
            }
            Err(e) => {
                OTP_WAIT_DURATION.with_label_values(&["gave_up"]).observe(elapsed);
                warn!("Job {} stopped waiting for passcode: {}", self.job_id, e);
            }
        }

        result
    }

    pub(crate) fn gate(&self) -> &Arc<OtpGate> {
        &self.gate
    }

    pub(crate) fn state(&self) -> &Arc<JobState> {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(timeout: Duration) -> JobContext {
        JobContext::new(
            Arc::new(JobState::new()),
            Arc::new(OtpGate::new()),
            timeout,
        )
    }

    #[test]
    fn test_progress_keeps_processing() {
        let ctx = context(Duration::from_secs(60));
        let snapshot = ctx.progress("scraping");
        assert_eq!(snapshot.status, JobStatus::Processing);
        assert_eq!(snapshot.message, "scraping");
    }

    #[tokio::test]
    async fn test_request_otp_enters_waiting_state() {
        let ctx = context(Duration::from_secs(60));
        let waiter = {
            let ctx = ctx.clone();
            tokio::spawn(async move { ctx.request_otp().await })
        };

        while ctx.state().status() != JobStatus::WaitingOtp {
            tokio::task::yield_now().await;
        }
        ctx.gate().submit("1234").unwrap();

        assert_eq!(waiter.await.unwrap(), Ok("1234".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_otp_times_out() {
        let ctx = context(Duration::from_secs(60));
        let result = ctx.request_otp().await;
        assert_eq!(result, Err(GateError::Timeout(Duration::from_secs(60))));
        assert_eq!(ctx.state().status(), JobStatus::WaitingOtp);
    }
}
