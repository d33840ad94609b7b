use crate::config::types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;

/// Longest accepted pause between requests; anything above is almost
/// certainly a typo.
pub const MAX_DELAY_SECONDS: f64 = 60.0;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Checks that a request delay is a finite number in `0..=60` seconds
pub fn validate_delay(delay_seconds: f64) -> Result<f64, ConfigError> {
    if !delay_seconds.is_finite() {
        return Err(ConfigError::Validation(
            "delay must be a valid number".to_string(),
        ));
    }

    if delay_seconds < 0.0 {
        return Err(ConfigError::Validation(format!(
            "delay cannot be negative, got {}",
            delay_seconds
        )));
    }

    if delay_seconds > MAX_DELAY_SECONDS {
        return Err(ConfigError::Validation(format!(
            "delay cannot exceed {} seconds, got {}",
            MAX_DELAY_SECONDS, delay_seconds
        )));
    }

    Ok(delay_seconds)
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_delay(config.delay_seconds)?;

    if config.timeout_seconds < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_seconds must be >= 1, got {}",
            config.timeout_seconds
        )));
    }

    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    // Header token characters only
    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters, '-', '_' or '.', got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    if config.comment.chars().any(|c| c.is_control() || c == '(' || c == ')') {
        return Err(ConfigError::Validation(
            "user agent comment cannot contain control characters or parentheses".to_string(),
        ));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.file_stem.trim().is_empty() {
        return Err(ConfigError::Validation(
            "file_stem cannot be empty".to_string(),
        ));
    }

    Ok(())
}
