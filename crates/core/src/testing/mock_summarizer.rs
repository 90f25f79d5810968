//! Mock summarizer for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::stages::{MarkdownSummarizer, Record, StageError, Summarizer};

/// Mock implementation of the Summarizer trait.
///
/// Renders with [`MarkdownSummarizer`] and records every batch it was given.
#[derive(Debug, Clone)]
pub struct MockSummarizer {
    /// Record batches passed to `summarize`.
    calls: Arc<RwLock<Vec<Vec<Record>>>>,
    /// If set, the next summary will fail with this error.
    next_error: Arc<RwLock<Option<StageError>>>,
}

impl Default for MockSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSummarizer {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Get all record batches summarized so far.
    pub async fn calls(&self) -> Vec<Vec<Record>> {
        self.calls.read().await.clone()
    }

    /// Configure the next summary to fail with the given error.
    pub async fn set_next_error(&self, error: StageError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn summarize(&self, records: &[Record]) -> Result<String, StageError> {
        self.calls.write().await.push(records.to_vec());

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        Ok(MarkdownSummarizer::render(records))
    }
}
