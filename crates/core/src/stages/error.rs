//! Error types for pipeline stages.

use thiserror::Error;

use crate::job::GateError;

/// Errors raised inside a pipeline stage.
#[derive(Debug, Error)]
pub enum StageError {
    /// The portal rejected the login.
    #[error("login failed: {0}")]
    Login(String),

    /// A page or element could not be reached.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// The notice list was empty.
    #[error("no records found")]
    NoRecords,

    /// A record was missing a required field.
    #[error("record {index} is missing field '{field}'")]
    MissingField { index: usize, field: &'static str },

    /// The stage cannot run with the current configuration.
    #[error("stage not configured: {0}")]
    NotConfigured(String),

    /// The digest could not be produced.
    #[error("summary failed: {0}")]
    Summary(String),

    /// A stage panicked instead of returning an error.
    #[error("stage panicked")]
    Panicked,

    /// Waiting for the passcode failed.
    #[error("passcode unavailable: {0}")]
    Otp(#[from] GateError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_error_display() {
        let err = StageError::MissingField {
            index: 2,
            field: "title",
        };
        assert_eq!(err.to_string(), "record 2 is missing field 'title'");

        let err = StageError::from(GateError::Timeout(Duration::from_secs(60)));
        assert_eq!(
            err.to_string(),
            "passcode unavailable: no passcode submitted within 60s"
        );
    }
}
