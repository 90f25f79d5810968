//! Shared job status record.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::debug;

use super::error::ErrorKind;
use super::types::{JobSnapshot, JobStatus};

const IDLE_MESSAGE: &str = "waiting for a job to start";

/// Fields guarded together so readers never see a torn update.
#[derive(Debug)]
pub(crate) struct JobRecord {
    status: JobStatus,
    message: String,
    result: String,
    last_update: DateTime<Utc>,
    failure: Option<ErrorKind>,
}

impl JobRecord {
    pub(crate) fn status(&self) -> JobStatus {
        self.status
    }

    pub(crate) fn set(&mut self, status: JobStatus, message: impl Into<String>) {
        let message = message.into();
        debug!("Job status {} -> {}: {}", self.status, status, message);
        self.status = status;
        self.message = message;
        if status != JobStatus::Error {
            self.failure = None;
        }
        // Keep last_update non-decreasing even if the wall clock steps back.
        self.last_update = Utc::now().max(self.last_update);
    }

    pub(crate) fn result(&self) -> &str {
        &self.result
    }

    pub(crate) fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            status: self.status,
            message: self.message.clone(),
            last_update: self.last_update,
            failure: self.failure,
        }
    }
}

/// Status, message and result of the current job.
///
/// One instance lives as long as the orchestrator that owns it. Every method
/// takes a short, synchronous lock and never awaits.
#[derive(Debug)]
pub struct JobState {
    inner: Mutex<JobRecord>,
}

impl Default for JobState {
    fn default() -> Self {
        Self::new()
    }
}

impl JobState {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(JobRecord {
                status: JobStatus::Idle,
                message: IDLE_MESSAGE.to_string(),
                result: String::new(),
                last_update: Utc::now(),
                failure: None,
            }),
        }
    }

    /// Set status and message, stamping the update time.
    pub fn update(&self, status: JobStatus, message: impl Into<String>) -> JobSnapshot {
        let mut record = self.lock();
        record.set(status, message);
        record.snapshot()
    }

    /// Move to `error`, remembering what kind of failure ended the job.
    pub fn fail(&self, kind: ErrorKind, message: impl Into<String>) -> JobSnapshot {
        let mut record = self.lock();
        record.set(JobStatus::Error, message);
        record.failure = Some(kind);
        record.snapshot()
    }

    /// Store the result and move to `done` in one step.
    pub fn complete(&self, result: impl Into<String>, message: impl Into<String>) -> JobSnapshot {
        let mut record = self.lock();
        record.result = result.into();
        record.set(JobStatus::Done, message);
        record.snapshot()
    }

    /// Clear the previous result and enter `processing` for a new job.
    pub fn reset(&self, message: impl Into<String>) -> JobSnapshot {
        let mut record = self.lock();
        record.result.clear();
        record.set(JobStatus::Processing, message);
        record.snapshot()
    }

    pub fn snapshot(&self) -> JobSnapshot {
        self.lock().snapshot()
    }

    pub fn status(&self) -> JobStatus {
        self.lock().status
    }

    pub fn set_result(&self, text: impl Into<String>) {
        self.lock().result = text.into();
    }

    /// The stored result text. Only meaningful once the status is `done`.
    pub fn result(&self) -> String {
        self.lock().result.clone()
    }

    /// Run `f` against the record while holding the lock.
    pub(crate) fn with_record<T>(&self, f: impl FnOnce(&mut JobRecord) -> T) -> T {
        f(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, JobRecord> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_new_state_is_idle() {
        let state = JobState::new();
        let snapshot = state.snapshot();
        assert_eq!(snapshot.status, JobStatus::Idle);
        assert_eq!(snapshot.message, IDLE_MESSAGE);
        assert!(snapshot.failure.is_none());
        assert!(state.result().is_empty());
    }

    #[test]
    fn test_update_sets_status_message_and_time() {
        let state = JobState::new();
        let before = state.snapshot().last_update;

        let snapshot = state.update(JobStatus::WaitingOtp, "waiting for passcode");

        assert_eq!(snapshot.status, JobStatus::WaitingOtp);
        assert_eq!(snapshot.message, "waiting for passcode");
        assert!(snapshot.last_update >= before);
        assert_eq!(state.snapshot(), snapshot);
    }

    #[test]
    fn test_fail_records_kind_until_next_update() {
        let state = JobState::new();
        let snapshot = state.fail(ErrorKind::Timeout, "otp timeout");
        assert_eq!(snapshot.status, JobStatus::Error);
        assert_eq!(snapshot.failure, Some(ErrorKind::Timeout));

        let snapshot = state.reset("starting");
        assert_eq!(snapshot.status, JobStatus::Processing);
        assert!(snapshot.failure.is_none());
    }

    #[test]
    fn test_complete_sets_result_and_done() {
        let state = JobState::new();
        let snapshot = state.complete("# digest", "completed");
        assert_eq!(snapshot.status, JobStatus::Done);
        assert_eq!(state.result(), "# digest");
    }

    #[test]
    fn test_reset_clears_result() {
        let state = JobState::new();
        state.set_result("# digest");
        state.update(JobStatus::Done, "completed");
        assert_eq!(state.result(), "# digest");

        state.reset("starting");
        assert!(state.result().is_empty());
        assert_eq!(state.status(), JobStatus::Processing);
    }

    #[test]
    fn test_updates_are_totally_ordered() {
        let state = JobState::new();
        let mut last = state.snapshot().last_update;
        for i in 0..100 {
            let snapshot = state.update(JobStatus::Processing, format!("step {}", i));
            assert!(snapshot.last_update >= last);
            last = snapshot.last_update;
        }
    }

    #[test]
    fn test_concurrent_readers_never_see_torn_state() {
        let state = Arc::new(JobState::new());

        let writer = {
            let state = Arc::clone(&state);
            std::thread::spawn(move || {
                for i in 0..1000 {
                    let status = if i % 2 == 0 {
                        JobStatus::Processing
                    } else {
                        JobStatus::WaitingOtp
                    };
                    state.update(status, status.as_str());
                }
            })
        };

        for _ in 0..1000 {
            let snapshot = state.snapshot();
            if snapshot.status != JobStatus::Idle {
                assert_eq!(snapshot.message, snapshot.status.as_str());
            }
        }

        writer.join().unwrap();
    }
}
