//! Mock authenticator for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::job::{Credentials, JobContext};
use crate::stages::{Authenticator, StageError};

/// Mock implementation of the Authenticator trait.
///
/// Provides controllable behavior for testing:
/// - Record logins and received passcodes for assertions
/// - Simulate login failures
/// - Reject passcodes that don't match an expected value
///
/// # Example
///
/// ```rust,ignore
/// use oabrief_core::testing::MockAuthenticator;
///
/// let auth = MockAuthenticator::new();
/// auth.set_expected_otp("123456").await;
///
/// // ... run a job and submit "123456" ...
///
/// assert_eq!(auth.received_otps().await, vec!["123456"]);
/// ```
#[derive(Debug, Clone)]
pub struct MockAuthenticator {
    /// Usernames of recorded login attempts.
    logins: Arc<RwLock<Vec<String>>>,
    /// Passcodes received through the gate.
    received_otps: Arc<RwLock<Vec<String>>>,
    /// If set, the next login will fail with this error before asking for a passcode.
    next_error: Arc<RwLock<Option<StageError>>>,
    /// If set, any other passcode fails the login.
    expected_otp: Arc<RwLock<Option<String>>>,
    /// Whether login asks for a passcode at all.
    require_otp: Arc<RwLock<bool>>,
}

impl Default for MockAuthenticator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAuthenticator {
    /// Create a new mock authenticator that asks for a passcode.
    pub fn new() -> Self {
        Self {
            logins: Arc::new(RwLock::new(Vec::new())),
            received_otps: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            expected_otp: Arc::new(RwLock::new(None)),
            require_otp: Arc::new(RwLock::new(true)),
        }
    }

    /// Get the usernames of all login attempts.
    pub async fn logins(&self) -> Vec<String> {
        self.logins.read().await.clone()
    }

    /// Get all passcodes received.
    pub async fn received_otps(&self) -> Vec<String> {
        self.received_otps.read().await.clone()
    }

    /// Configure the next login to fail with the given error.
    pub async fn set_next_error(&self, error: StageError) {
        *self.next_error.write().await = Some(error);
    }

    /// Only accept this passcode.
    pub async fn set_expected_otp(&self, otp: impl Into<String>) {
        *self.expected_otp.write().await = Some(otp.into());
    }

    /// Enable or disable the passcode step.
    pub async fn set_require_otp(&self, require: bool) {
        *self.require_otp.write().await = require;
    }
}

#[async_trait]
impl Authenticator for MockAuthenticator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn login(&self, credentials: &Credentials, ctx: &JobContext) -> Result<(), StageError> {
        self.logins.write().await.push(credentials.username.clone());

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        if !*self.require_otp.read().await {
            return Ok(());
        }

        let otp = ctx.request_otp().await?;
        self.received_otps.write().await.push(otp.clone());

        match self.expected_otp.read().await.as_deref() {
            Some(expected) if expected != otp => {
                Err(StageError::Login("passcode rejected".to_string()))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{JobState, JobStatus, OtpGate};
    use crate::testing::fixtures;
    use std::time::Duration;

    fn context() -> (JobContext, Arc<OtpGate>) {
        let gate = Arc::new(OtpGate::new());
        let ctx = JobContext::new(
            Arc::new(JobState::new()),
            Arc::clone(&gate),
            Duration::from_secs(5),
        );
        (ctx, gate)
    }

    #[tokio::test]
    async fn test_records_login_and_passcode() {
        let auth = MockAuthenticator::new();
        let (ctx, gate) = context();
        gate.submit("9999").unwrap();

        auth.login(&fixtures::credentials(), &ctx).await.unwrap();

        assert_eq!(auth.logins().await, vec!["a".to_string()]);
        assert_eq!(auth.received_otps().await, vec!["9999".to_string()]);
    }

    #[tokio::test]
    async fn test_wrong_passcode_fails() {
        let auth = MockAuthenticator::new();
        auth.set_expected_otp("1234").await;
        let (ctx, gate) = context();
        gate.submit("0000").unwrap();

        let err = auth.login(&fixtures::credentials(), &ctx).await.unwrap_err();
        assert!(matches!(err, StageError::Login(_)));
    }

    #[tokio::test]
    async fn test_next_error_is_consumed() {
        let auth = MockAuthenticator::new();
        auth.set_require_otp(false).await;
        auth.set_next_error(StageError::Navigation("no login form".to_string()))
            .await;
        let (ctx, _gate) = context();

        assert!(auth.login(&fixtures::credentials(), &ctx).await.is_err());
        assert!(auth.login(&fixtures::credentials(), &ctx).await.is_ok());
        assert_eq!(auth.logins().await.len(), 2);
    }

    #[tokio::test]
    async fn test_login_without_passcode_step() {
        let auth = MockAuthenticator::new();
        auth.set_require_otp(false).await;
        let state = Arc::new(JobState::new());
        let ctx = JobContext::new(
            Arc::clone(&state),
            Arc::new(OtpGate::new()),
            Duration::from_secs(5),
        );

        auth.login(&fixtures::credentials(), &ctx).await.unwrap();

        assert_eq!(state.status(), JobStatus::Idle);
        assert!(auth.received_otps().await.is_empty());
    }
}
