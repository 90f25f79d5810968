//! Job configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the job orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// How long the login stage waits for a passcode (seconds).
    /// The job fails with a timeout when nobody submits one in time.
    #[serde(default = "default_otp_timeout")]
    pub otp_timeout_secs: u64,
}

fn default_otp_timeout() -> u64 {
    60
}

impl JobConfig {
    pub fn otp_timeout(&self) -> Duration {
        Duration::from_secs(self.otp_timeout_secs)
    }
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            otp_timeout_secs: default_otp_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = JobConfig::default();
        assert_eq!(config.otp_timeout_secs, 60);
        assert_eq!(config.otp_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_deserialize_full() {
        let config: JobConfig = toml::from_str("otp_timeout_secs = 120").unwrap();
        assert_eq!(config.otp_timeout(), Duration::from_secs(120));
    }
}
