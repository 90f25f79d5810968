//! Error taxonomy for job operations.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::JobStatus;
use crate::stages::StageError;

/// Errors surfaced by the orchestrator.
///
/// Validation, conflict and state errors are returned to the caller of the
/// failing operation. Timeout and stage errors happen inside the background
/// job and are only observable through the job status.
#[derive(Debug, Error)]
pub enum JobError {
    /// Malformed input, rejected before any state change.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A job is already running.
    #[error("a job is already running")]
    Conflict,

    /// A passcode was submitted while the job was not waiting for one.
    #[error("no passcode expected (job is {status})")]
    OtpNotExpected { status: JobStatus },

    /// The result was requested before the job finished.
    #[error("result not ready (job is {status})")]
    NotReady { status: JobStatus },

    /// Nobody submitted a passcode before the deadline.
    #[error("otp timeout after {}s", .0.as_secs())]
    OtpTimeout(Duration),

    /// A pipeline stage failed.
    #[error("stage failed: {0}")]
    Stage(#[from] StageError),
}

/// Coarse classification of a [`JobError`], stable for callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Conflict,
    State,
    Timeout,
    Stage,
}

impl JobError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            JobError::Validation(_) => ErrorKind::Validation,
            JobError::Conflict => ErrorKind::Conflict,
            JobError::OtpNotExpected { .. } | JobError::NotReady { .. } => ErrorKind::State,
            JobError::OtpTimeout(_) => ErrorKind::Timeout,
            JobError::Stage(_) => ErrorKind::Stage,
        }
    }
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Conflict => "conflict",
            ErrorKind::State => "state",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Stage => "stage",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(JobError::Conflict.kind(), ErrorKind::Conflict);
        assert_eq!(
            JobError::Validation("bad".to_string()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            JobError::OtpNotExpected {
                status: JobStatus::Idle
            }
            .kind(),
            ErrorKind::State
        );
        assert_eq!(
            JobError::NotReady {
                status: JobStatus::Processing
            }
            .kind(),
            ErrorKind::State
        );
        assert_eq!(
            JobError::OtpTimeout(Duration::from_secs(60)).kind(),
            ErrorKind::Timeout
        );
        assert_eq!(
            JobError::from(StageError::NoRecords).kind(),
            ErrorKind::Stage
        );
    }

    #[test]
    fn test_error_display() {
        let err = JobError::OtpNotExpected {
            status: JobStatus::Done,
        };
        assert_eq!(err.to_string(), "no passcode expected (job is done)");

        let err = JobError::OtpTimeout(Duration::from_secs(60));
        assert_eq!(err.to_string(), "otp timeout after 60s");
    }

    #[test]
    fn test_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&ErrorKind::Timeout).unwrap(),
            "\"timeout\""
        );
        assert_eq!(ErrorKind::Stage.as_str(), "stage");
    }
}
