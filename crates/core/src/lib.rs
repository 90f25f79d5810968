pub mod config;
pub mod job;
pub mod metrics;
pub mod stages;
pub mod testing;

pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError, PipelineConfig, ServerConfig, WebConfig,
};
pub use job::{
    Credentials, ErrorKind, GateError, JobConfig, JobContext, JobError, JobOrchestrator,
    JobSnapshot, JobState, JobStatus, OtpGate, PipelineStages, OTP_MAX_LEN, OTP_MIN_LEN,
};
pub use stages::{
    Authenticator, DemoAuthenticator, DemoScraper, MarkdownSummarizer, Record, Scraper,
    StageError, Summarizer,
};
