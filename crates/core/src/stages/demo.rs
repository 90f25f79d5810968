//! Simulated portal stages.
//!
//! These walk through the same status transitions as a real login and scrape
//! so the dashboard and passcode flow can be exercised end to end.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, Utc};
use tracing::debug;

use super::error::StageError;
use super::traits::{Authenticator, Scraper};
use super::types::Record;
use crate::config::PipelineConfig;
use crate::job::{Credentials, JobContext};

/// Simulated WebVPN login that asks for a one-time passcode.
#[derive(Debug, Clone)]
pub struct DemoAuthenticator {
    step_delay: Duration,
}

impl DemoAuthenticator {
    pub fn new(step_delay: Duration) -> Self {
        Self { step_delay }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(Duration::from_millis(config.step_delay_ms))
    }
}

#[async_trait]
impl Authenticator for DemoAuthenticator {
    fn name(&self) -> &str {
        "demo"
    }

    async fn login(&self, credentials: &Credentials, ctx: &JobContext) -> Result<(), StageError> {
        ctx.progress("logging in to WebVPN");
        tokio::time::sleep(self.step_delay).await;

        credentials
            .validate()
            .map_err(|e| StageError::Login(e.to_string()))?;

        let otp = ctx.request_otp().await?;
        debug!(
            "Submitting {}-character passcode for {}",
            otp.chars().count(),
            credentials.username
        );

        ctx.progress("login succeeded, entering OA");
        tokio::time::sleep(self.step_delay).await;
        Ok(())
    }
}

/// Scraper that serves sample notices when mock mode is enabled.
#[derive(Debug, Clone)]
pub struct DemoScraper {
    mock_mode: bool,
    step_delay: Duration,
}

impl DemoScraper {
    pub fn new(mock_mode: bool, step_delay: Duration) -> Self {
        Self {
            mock_mode,
            step_delay,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.mock_mode, Duration::from_millis(config.step_delay_ms))
    }

    fn sample_records() -> Vec<Record> {
        let today = Utc::now().date_naive();
        vec![
            Record::new(
                "Final exam arrangements",
                "Academic Affairs Office",
                today - Days::new(7),
                "Colleges must report their final exam arrangements by the end of the month.",
            ),
            Record::new(
                "Campus lecture: AI and education",
                "Research Office",
                today - Days::new(3),
                "Library auditorium, all staff and students welcome.",
            ),
        ]
    }
}

#[async_trait]
impl Scraper for DemoScraper {
    fn name(&self) -> &str {
        "demo"
    }

    async fn scrape(&self, ctx: &JobContext) -> Result<Vec<Record>, StageError> {
        if !self.mock_mode {
            return Err(StageError::NotConfigured(
                "live portal scraping is not available, enable pipeline.mock_mode".to_string(),
            ));
        }

        ctx.progress("fetching notice list");
        tokio::time::sleep(self.step_delay).await;

        let records = Self::sample_records();

        ctx.progress("reading detail pages");
        tokio::time::sleep(self.step_delay).await;

        for (index, record) in records.iter().enumerate() {
            record.validate(index)?;
        }
        Ok(records)
    }
}
