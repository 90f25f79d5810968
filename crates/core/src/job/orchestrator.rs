//! Single-flight job orchestrator.
//!
//! Runs at most one job at a time. A job is spawned on the tokio runtime and
//! moves the shared [`JobState`] through
//! `processing -> waiting_otp -> processing -> done | error`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tokio::task::{AbortHandle, JoinHandle};
use tracing::{error, info, warn};

use super::config::JobConfig;
use super::context::JobContext;
use super::error::{ErrorKind, JobError};
use super::gate::{GateError, OtpGate};
use super::state::JobState;
use super::types::{validate_otp, Credentials, JobSnapshot, JobStatus};
use crate::metrics::{JOBS_STARTED, JOB_CONFLICTS, JOB_DURATION, JOB_OUTCOMES, OTP_SUBMISSIONS};
use crate::stages::{Authenticator, Scraper, StageError, Summarizer};

const STARTING_MESSAGE: &str = "initializing job";
const OTP_ACCEPTED_MESSAGE: &str = "passcode received, resuming";
const OTP_TIMEOUT_MESSAGE: &str = "otp timeout";

/// The stages a job runs, in order.
#[derive(Clone)]
pub struct PipelineStages {
    pub authenticator: Arc<dyn Authenticator>,
    pub scraper: Arc<dyn Scraper>,
    pub summarizer: Arc<dyn Summarizer>,
}

impl PipelineStages {
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        scraper: Arc<dyn Scraper>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        Self {
            authenticator,
            scraper,
            summarizer,
        }
    }
}

/// The most recently started job. Kept after it finishes so the next start
/// can tell it is no longer running.
struct ActiveJob {
    ctx: JobContext,
    handle: JoinHandle<()>,
}

/// Owns the job state and the single job slot.
pub struct JobOrchestrator {
    config: JobConfig,
    stages: PipelineStages,
    state: Arc<JobState>,
    active: Mutex<Option<ActiveJob>>,
}

impl JobOrchestrator {
    pub fn new(config: JobConfig, stages: PipelineStages) -> Self {
        info!(
            "Job orchestrator using stages: login={}, scrape={}, summarize={}",
            stages.authenticator.name(),
            stages.scraper.name(),
            stages.summarizer.name()
        );
        Self {
            config,
            stages,
            state: Arc::new(JobState::new()),
            active: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Start a new job unless one is already running.
    ///
    /// Returns as soon as the job is spawned; its outcome is only visible
    /// through [`status`](Self::status). Must be called from within a tokio
    /// runtime.
    pub fn start(&self, credentials: Credentials) -> Result<JobSnapshot, JobError> {
        credentials.validate()?;

        let mut active = self.lock_active();
        if self.is_running(active.as_ref()) {
            JOB_CONFLICTS.inc();
            warn!("Rejected start: a job is already running");
            return Err(JobError::Conflict);
        }

        let gate = Arc::new(OtpGate::new());
        let ctx = JobContext::new(Arc::clone(&self.state), gate, self.config.otp_timeout());
        let snapshot = self.state.reset(STARTING_MESSAGE);

        info!("Starting job {} for {}", ctx.job_id(), credentials.username);
        let handle = tokio::spawn(run_job(ctx.clone(), self.stages.clone(), credentials));
        *active = Some(ActiveJob { ctx, handle });
        JOBS_STARTED.inc();

        Ok(snapshot)
    }

    /// Hand a passcode to the job waiting for one.
    pub fn submit_otp(&self, otp: &str) -> Result<JobSnapshot, JobError> {
        validate_otp(otp)?;

        let active = self.lock_active();
        let gate = active.as_ref().map(|job| Arc::clone(job.ctx.gate()));

        let result = self.state.with_record(|record| {
            let status = record.status();
            if status != JobStatus::WaitingOtp {
                return Err(JobError::OtpNotExpected { status });
            }
            let gate = gate.ok_or(JobError::OtpNotExpected { status })?;
            gate.submit(otp).map_err(|e| {
                warn!("Passcode not delivered: {}", e);
                JobError::OtpNotExpected { status }
            })?;
            record.set(JobStatus::Processing, OTP_ACCEPTED_MESSAGE);
            Ok(record.snapshot())
        });
        drop(active);

        match &result {
            Ok(_) => OTP_SUBMISSIONS.with_label_values(&["accepted"]).inc(),
            Err(e) => {
                warn!("Rejected passcode submission: {}", e);
                OTP_SUBMISSIONS.with_label_values(&["rejected"]).inc();
            }
        }
        result
    }

    /// Current status snapshot. Never fails.
    pub fn status(&self) -> JobSnapshot {
        self.state.snapshot()
    }

    /// The digest of the last job, once it is `done`.
    pub fn result(&self) -> Result<String, JobError> {
        self.state.with_record(|record| match record.status() {
            JobStatus::Done => Ok(record.result().to_string()),
            status => Err(JobError::NotReady { status }),
        })
    }

    /// Whether a job is currently running.
    pub fn is_active(&self) -> bool {
        let active = self.lock_active();
        self.is_running(active.as_ref())
    }

    /// Abort the running job, if any. Used on server shutdown.
    pub fn shutdown(&self) {
        let active = self.lock_active();
        if let Some(job) = active.as_ref() {
            if !job.handle.is_finished() {
                info!("Aborting job {}", job.ctx.job_id());
                job.handle.abort();
            }
            job.ctx.gate().close();
        }
    }

    /// A job counts as running until both its task finished and its terminal
    /// status was written; the terminal write is always the task's last one.
    fn is_running(&self, job: Option<&ActiveJob>) -> bool {
        match job {
            Some(job) => !job.handle.is_finished() && !self.state.status().is_terminal(),
            None => false,
        }
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<ActiveJob>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Background flow for one job. Never propagates errors: every failure ends
/// up as an `error` status.
async fn run_job(ctx: JobContext, stages: PipelineStages, credentials: Credentials) {
    let started = Instant::now();

    // Stages run in their own task so a panic surfaces as a JoinError here
    // instead of unwinding past the terminal status write.
    let stages_task = {
        let ctx = ctx.clone();
        tokio::spawn(async move { drive_stages(&ctx, &stages, &credentials).await })
    };
    let _abort = AbortOnDrop(stages_task.abort_handle());

    let outcome = match stages_task.await {
        Ok(outcome) => outcome,
        Err(e) if e.is_panic() => Err(JobError::Stage(StageError::Panicked)),
        Err(e) => {
            warn!("Job {} stages cancelled: {}", ctx.job_id(), e);
            ctx.gate().close();
            return;
        }
    };

    // Stale from here on: late passcodes must not reach this gate.
    ctx.gate().close();

    let label = match &outcome {
        Ok(result) => {
            ctx.state().complete(result.as_str(), "completed");
            info!("Job {} completed", ctx.job_id());
            "done"
        }
        Err(e) => {
            let message = match e {
                JobError::OtpTimeout(_) => OTP_TIMEOUT_MESSAGE.to_string(),
                other => format!("job failed: {}", other),
            };
            if e.kind() == ErrorKind::Timeout {
                warn!("Job {} timed out waiting for passcode", ctx.job_id());
            } else {
                error!("Job {} failed: {}", ctx.job_id(), e);
            }
            ctx.state().fail(e.kind(), message);
            if e.kind() == ErrorKind::Timeout {
                "timeout"
            } else {
                "stage_error"
            }
        }
    };

    JOB_OUTCOMES.with_label_values(&[label]).inc();
    JOB_DURATION
        .with_label_values(&[label])
        .observe(started.elapsed().as_secs_f64());
}

/// Aborts the stage task when the job task itself is aborted on shutdown.
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

async fn drive_stages(
    ctx: &JobContext,
    stages: &PipelineStages,
    credentials: &Credentials,
) -> Result<String, JobError> {
    ctx.progress("logging in");
    stages
        .authenticator
        .login(credentials, ctx)
        .await
        .map_err(classify)?;

    ctx.progress("scraping");
    let records = stages.scraper.scrape(ctx).await.map_err(classify)?;
    if records.is_empty() {
        return Err(StageError::NoRecords.into());
    }
    info!("Job {} scraped {} records", ctx.job_id(), records.len());

    ctx.progress("summarizing");
    let summary = stages
        .summarizer
        .summarize(&records)
        .await
        .map_err(classify)?;

    Ok(summary)
}

/// A passcode deadline inside any stage ends the job as a timeout.
fn classify(err: StageError) -> JobError {
    match err {
        StageError::Otp(GateError::Timeout(after)) => JobError::OtpTimeout(after),
        other => JobError::Stage(other),
    }
}
