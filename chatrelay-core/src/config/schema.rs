//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration for chatrelay
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Adapter configuration
    #[serde(default)]
    pub adapters: AdaptersConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Adapter configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdaptersConfig {
    #[serde(default)]
    pub slack: SlackConfig,
}

/// Slack adapter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Platform auth token
    #[serde(default)]
    pub token: String,
    /// Default channel name for `send`; empty resolves to "general"
    #[serde(default)]
    pub channel: String,
    /// Web API base URL
    #[serde(default = "default_slack_api_base")]
    pub api_base_url: String,
    /// Cap on concurrently running message-translation tasks
    #[serde(default = "default_message_concurrency")]
    pub message_concurrency: usize,
}

fn default_slack_api_base() -> String {
    "https://slack.com/api".to_string()
}

fn default_message_concurrency() -> usize {
    32
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            token: String::new(),
            channel: String::new(),
            api_base_url: default_slack_api_base(),
            message_concurrency: default_message_concurrency(),
        }
    }
}

impl SlackConfig {
    /// Resolved default channel name
    ///
    /// The platform convention is "general" when no channel is configured.
    pub fn default_channel(&self) -> &str {
        if self.channel.is_empty() {
            "general"
        } else {
            &self.channel
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Directory for log files
    #[serde(default = "default_log_dir")]
    pub dir: String,
    /// Module-specific overrides
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: default_log_dir(),
            overrides: HashMap::new(),
        }
    }
}
