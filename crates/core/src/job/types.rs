//! Types shared by the job orchestrator and its callers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{ErrorKind, JobError};

/// Shortest passcode accepted by `JobOrchestrator::submit_otp`.
pub const OTP_MIN_LEN: usize = 4;
/// Longest passcode accepted by `JobOrchestrator::submit_otp`.
pub const OTP_MAX_LEN: usize = 12;

/// Where the current (or last) job is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// No job has been started since the process came up.
    Idle,
    /// A stage is running.
    Processing,
    /// Login is suspended until a passcode is submitted.
    WaitingOtp,
    /// The digest is ready.
    Done,
    /// The job failed; a new start is required.
    Error,
}

impl JobStatus {
    /// Terminal statuses leave the job inert until the next start.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Idle => "idle",
            JobStatus::Processing => "processing",
            JobStatus::WaitingOtp => "waiting_otp",
            JobStatus::Done => "done",
            JobStatus::Error => "error",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A consistent view of the job state at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub status: JobStatus,
    pub message: String,
    pub last_update: DateTime<Utc>,
    /// Kind of the failure when `status` is `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<ErrorKind>,
}

/// Portal login credentials.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Build credentials, rejecting an empty identity or secret.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, JobError> {
        let credentials = Self {
            username: username.into(),
            password: password.into(),
        };
        credentials.validate()?;
        Ok(credentials)
    }

    pub fn validate(&self) -> Result<(), JobError> {
        if self.username.trim().is_empty() {
            return Err(JobError::Validation("username must not be empty".to_string()));
        }
        if self.password.is_empty() {
            return Err(JobError::Validation("password must not be empty".to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Check a submitted passcode is between [`OTP_MIN_LEN`] and [`OTP_MAX_LEN`] characters.
pub(crate) fn validate_otp(otp: &str) -> Result<(), JobError> {
    let len = otp.chars().count();
    if !(OTP_MIN_LEN..=OTP_MAX_LEN).contains(&len) {
        return Err(JobError::Validation(format!(
            "otp must be {}-{} characters, got {}",
            OTP_MIN_LEN, OTP_MAX_LEN, len
        )));
    }
    Ok(())
}
