//! Mock scraper for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::fixtures;
use crate::job::JobContext;
use crate::stages::{Record, Scraper, StageError};

/// Mock implementation of the Scraper trait.
///
/// Returns [`fixtures::sample_records`] unless configured otherwise.
#[derive(Debug, Clone)]
pub struct MockScraper {
    /// Records returned by the next scrape.
    records: Arc<RwLock<Vec<Record>>>,
    /// If set, the next scrape will fail with this error.
    next_error: Arc<RwLock<Option<StageError>>>,
    /// If set, the next scrape panics.
    panic_next: Arc<RwLock<bool>>,
    /// Simulated scrape duration.
    delay: Arc<RwLock<Duration>>,
    /// Number of scrapes performed.
    scrape_count: Arc<RwLock<usize>>,
}

impl Default for MockScraper {
    fn default() -> Self {
        Self::new()
    }
}

impl MockScraper {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(fixtures::sample_records())),
            next_error: Arc::new(RwLock::new(None)),
            panic_next: Arc::new(RwLock::new(false)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            scrape_count: Arc::new(RwLock::new(0)),
        }
    }

    /// Replace the records returned by scrapes.
    pub async fn set_records(&self, records: Vec<Record>) {
        *self.records.write().await = records;
    }

    /// Configure the next scrape to fail with the given error.
    pub async fn set_next_error(&self, error: StageError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make the next scrape panic, as a buggy stage would.
    pub async fn set_next_panic(&self) {
        *self.panic_next.write().await = true;
    }

    /// Set the simulated scrape duration.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Get the number of scrapes performed.
    pub async fn scrape_count(&self) -> usize {
        *self.scrape_count.read().await
    }
}

#[async_trait]
impl Scraper for MockScraper {
    fn name(&self) -> &str {
        "mock"
    }

    async fn scrape(&self, ctx: &JobContext) -> Result<Vec<Record>, StageError> {
        *self.scrape_count.write().await += 1;
        ctx.progress("scraping mock portal");

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        let panic_next = std::mem::take(&mut *self.panic_next.write().await);
        if panic_next {
            panic!("mock scraper panicked");
        }

        let records = self.records.read().await.clone();
        if records.is_empty() {
            return Err(StageError::NoRecords);
        }
        for (index, record) in records.iter().enumerate() {
            record.validate(index)?;
        }
        Ok(records)
    }
}
