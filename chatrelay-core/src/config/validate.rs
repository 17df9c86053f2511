//! Configuration validation rules.

use super::schema::Config;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate configuration and return aggregated validation errors.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    let mut errors = Vec::new();

    if config.adapters.slack.enabled {
        if config.adapters.slack.token.trim().is_empty() {
            errors.push("adapters.slack.token is required when slack is enabled".to_string());
        }
        if config.adapters.slack.api_base_url.trim().is_empty() {
            errors.push("adapters.slack.api_base_url must not be empty".to_string());
        }
        if config.adapters.slack.message_concurrency == 0 {
            errors.push("adapters.slack.message_concurrency must be > 0".to_string());
        }
    }

    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        errors.push(format!(
            "logging.level must be one of {:?}, got {:?}",
            LOG_LEVELS, config.logging.level
        ));
    }
    if config.logging.format != "text" && config.logging.format != "json" {
        errors.push(format!(
            "logging.format must be \"text\" or \"json\", got {:?}",
            config.logging.format
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Validation(errors.join("; ")))
    }
}
