//! Pipeline stages driven by the job orchestrator.
//!
//! The orchestrator only depends on the traits here. The bundled
//! implementations simulate the portal; real ones plug in behind the same
//! contracts.

mod demo;
mod error;
mod markdown;
mod traits;
mod types;

pub use demo::{DemoAuthenticator, DemoScraper};
pub use error::StageError;
pub use markdown::MarkdownSummarizer;
pub use traits::{Authenticator, Scraper, Summarizer};
pub use types::Record;
