use crate::config::types::CrawlConfig;
use crate::ConfigError;
use regex::Regex;

/// Validates the entire configuration
///
/// Runs once when a configuration is loaded or a scheduler is constructed.
/// Checks numeric ranges, compiles every filter pattern, and verifies the
/// allowed-domain patterns.
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1".to_string(),
        ));
    }

    if config.max_concurrency < 1 || config.max_concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrency must be between 1 and 100, got {}",
            config.max_concurrency
        )));
    }

    if config.timeout_ms < 1000 {
        return Err(ConfigError::Validation(format!(
            "timeout-ms must be >= 1000ms, got {}ms",
            config.timeout_ms
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    for pattern in config
        .exclude_patterns
        .iter()
        .chain(config.include_patterns.iter())
    {
        Regex::new(pattern)
            .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))?;
    }

    for domain in &config.allowed_domains {
        validate_domain_pattern(domain)?;
    }

    Ok(())
}

/// Validates a domain pattern (supports a leading "*." wildcard)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    let base = pattern.strip_prefix("*.").unwrap_or(pattern);

    if base.is_empty() {
        return Err(ConfigError::InvalidDomain(
            "domain pattern cannot be empty".to_string(),
        ));
    }

    if !base
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidDomain(format!(
            "domain '{}' contains invalid characters",
            pattern
        )));
    }

    if base.starts_with('.') || base.ends_with('.') || base.starts_with('-') || base.ends_with('-')
    {
        return Err(ConfigError::InvalidDomain(format!(
            "domain '{}' cannot start or end with '.' or '-'",
            pattern
        )));
    }

    if base.contains("..") {
        return Err(ConfigError::InvalidDomain(format!(
            "domain '{}' cannot contain consecutive dots",
            pattern
        )));
    }

    Ok(())
}
