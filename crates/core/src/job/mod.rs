//! Single-flight job orchestration.
//!
//! One background job at a time drives the pipeline stages:
//! - **Login**: suspends once on the [`OtpGate`] until a human submits the passcode
//! - **Scrape**: collects the portal notices
//! - **Summarize**: renders the digest stored as the job result
//!
//! Progress is published through [`JobState`], which request handlers poll.

mod config;
mod context;
mod error;
mod gate;
mod orchestrator;
mod state;
mod types;

pub use config::JobConfig;
pub use context::JobContext;
pub use error::{ErrorKind, JobError};
pub use gate::{GateError, OtpGate};
pub use orchestrator::{JobOrchestrator, PipelineStages};
pub use state::JobState;
pub use types::{Credentials, JobSnapshot, JobStatus, OTP_MAX_LEN, OTP_MIN_LEN};
