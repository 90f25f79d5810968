//! Trait definitions for pipeline stages.

use async_trait::async_trait;

use super::error::StageError;
use super::types::Record;
use crate::job::{Credentials, JobContext};

/// Logs in to the portal.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Returns the name of this implementation.
    fn name(&self) -> &str;

    /// Perform the login. When the portal asks for a one-time passcode the
    /// implementation calls [`JobContext::request_otp`] and continues with
    /// the returned value.
    async fn login(&self, credentials: &Credentials, ctx: &JobContext) -> Result<(), StageError>;
}

/// Collects notices from the portal after login.
#[async_trait]
pub trait Scraper: Send + Sync {
    fn name(&self) -> &str;

    /// Returns the notices in portal order. Fails when none are found or a
    /// required field cannot be read.
    async fn scrape(&self, ctx: &JobContext) -> Result<Vec<Record>, StageError>;
}

/// Turns scraped notices into the digest text.
#[async_trait]
pub trait Summarizer: Send + Sync {
    fn name(&self) -> &str;

    async fn summarize(&self, records: &[Record]) -> Result<String, StageError>;
}
