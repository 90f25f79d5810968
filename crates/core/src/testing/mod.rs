//! Testing utilities and mock implementations of the pipeline stages.
//!
//! The mocks let tests drive the job orchestrator without a real portal.
//!
//! # Example
//!
//! ```rust,ignore
//! use oabrief_core::testing::{fixtures, MockAuthenticator, MockScraper, MockSummarizer};
//!
//! let scraper = MockScraper::new();
//! scraper.set_records(vec![fixtures::record("Exam schedule")]).await;
//!
//! let stages = fixtures::stages(MockAuthenticator::new(), scraper, MockSummarizer::new());
//! let orchestrator = JobOrchestrator::new(JobConfig::default(), stages);
//! ```

mod mock_authenticator;
mod mock_scraper;
mod mock_summarizer;

pub use mock_authenticator::MockAuthenticator;
pub use mock_scraper::MockScraper;
pub use mock_summarizer::MockSummarizer;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use crate::job::{Credentials, PipelineStages};
    use crate::stages::{Authenticator, Record, Scraper, Summarizer};

    /// Credentials that pass validation.
    pub fn credentials() -> Credentials {
        Credentials {
            username: "a".to_string(),
            password: "b".to_string(),
        }
    }

    /// Create a test record with reasonable defaults.
    pub fn record(title: &str) -> Record {
        Record::new(
            title,
            "Academic Affairs Office",
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap_or_default(),
            format!("Details about {}.", title.to_lowercase()),
        )
    }

    /// The records [`MockScraper`](super::MockScraper) returns by default.
    pub fn sample_records() -> Vec<Record> {
        vec![
            record("Final exam arrangements"),
            record("Campus lecture: AI and education"),
            record("Library opening hours"),
        ]
    }

    /// Bundle stage implementations for the orchestrator.
    pub fn stages(
        authenticator: impl Authenticator + 'static,
        scraper: impl Scraper + 'static,
        summarizer: impl Summarizer + 'static,
    ) -> PipelineStages {
        PipelineStages::new(
            Arc::new(authenticator),
            Arc::new(scraper),
            Arc::new(summarizer),
        )
    }
}
