//! Configuration for the CLA service.

use cla_identity::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::warn;

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Bot names per code host
    #[serde(default)]
    pub bots: BotConfig,

    /// Identity and employment lookup retries
    #[serde(default)]
    pub retry: RetryConfig,

    /// Cleanup of a previously installed CLA app
    #[serde(default)]
    pub legacy: LegacyConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Name of the app on one code host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotFlavor {
    pub name: String,
}

/// Bot names keyed by code-host DNS name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub flavors: HashMap<String, BotFlavor>,

    /// Used for hosts without a flavor
    #[serde(default = "default_bot_name")]
    pub default_name: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            flavors: HashMap::new(),
            default_name: default_bot_name(),
        }
    }
}

impl BotConfig {
    pub fn with_flavor(mut self, host: impl Into<String>, name: impl Into<String>) -> Self {
        self.flavors
            .insert(host.into(), BotFlavor { name: name.into() });
        self
    }

    /// Bot name configured for `host`, falling back to the default name.
    pub fn name_for_host(&self, host: &str) -> &str {
        match self.flavors.get(host) {
            Some(flavor) => &flavor.name,
            None => {
                warn!(
                    host,
                    default = %self.default_name,
                    "No bot flavor configured for host, using default name"
                );
                &self.default_name
            }
        }
    }
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry; doubles on each retry
    #[serde(default = "default_base_delay")]
    pub base_delay_secs: u64,

    /// Overall budget per lookup
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_secs: default_base_delay(),
            deadline_secs: None,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        let policy = RetryPolicy::new(self.max_retries, Duration::from_secs(self.base_delay_secs));
        match self.deadline_secs {
            Some(secs) => policy.with_deadline(Duration::from_secs(secs)),
            None => policy,
        }
    }
}

/// Legacy app configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegacyConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Name of the legacy app; its comments are authored by `<name>[bot]`
    #[serde(default)]
    pub app_name: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_bot_name() -> String {
    "microsoft-github-policy-service".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay() -> u64 {
    2
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ServiceConfig {
    /// Load configuration: defaults, then an optional file, then `CLA__*`
    /// environment variables (`CLA__LEGACY__ENABLED=true`).
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&ServiceConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("CLA")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert!(!config.legacy.enabled);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.retry.policy(), RetryPolicy::default());
    }

    #[test]
    fn test_bot_name_fallback() {
        let bots = BotConfig::default().with_flavor("github.com", "cla-bot");
        assert_eq!(bots.name_for_host("github.com"), "cla-bot");
        assert_eq!(
            bots.name_for_host("ghe.example.com"),
            "microsoft-github-policy-service"
        );
    }

    #[test]
    fn test_retry_deadline() {
        let retry = RetryConfig {
            deadline_secs: Some(10),
            ..RetryConfig::default()
        };
        assert_eq!(retry.policy().deadline, Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = ServiceConfig::load(None).unwrap();
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.bots.default_name, "microsoft-github-policy-service");
    }
}
