use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - OTP timeout is not 0
/// - Static directory is not empty
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.job.otp_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "job.otp_timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.web.static_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "web.static_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}
