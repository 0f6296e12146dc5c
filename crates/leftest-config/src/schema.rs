//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_TEST_ID_ATTRIBUTE: &str = "data-testid";
pub const DEFAULT_COMPONENT_ATTRIBUTE: &str = "data-component-name";
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 4000;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tags: TagsConfig,

    #[serde(default)]
    pub harness: HarnessConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Tag selection applied to suites.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagsConfig {
    /// Selection string such as `"smoke,^slow"`.
    #[serde(default)]
    pub filter: Option<String>,
}

/// Selector DSL and locator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    #[serde(default = "default_test_id_attribute")]
    pub test_id_attribute: String,

    #[serde(default = "default_component_attribute")]
    pub component_attribute: String,

    #[serde(default = "default_wait_timeout_ms")]
    pub wait_timeout_ms: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            test_id_attribute: default_test_id_attribute(),
            component_attribute: default_component_attribute(),
            wait_timeout_ms: default_wait_timeout_ms(),
        }
    }
}

impl HarnessConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }
}

fn default_test_id_attribute() -> String {
    DEFAULT_TEST_ID_ATTRIBUTE.to_string()
}

fn default_component_attribute() -> String {
    DEFAULT_COMPONENT_ATTRIBUTE.to_string()
}

fn default_wait_timeout_ms() -> u64 {
    DEFAULT_WAIT_TIMEOUT_MS
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.tags.filter, None);
        assert_eq!(config.harness.test_id_attribute, "data-testid");
        assert_eq!(config.harness.component_attribute, "data-component-name");
        assert_eq!(config.harness.wait_timeout(), Duration::from_millis(4000));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config: Config = toml::from_str(
            r#"
            [harness]
            wait_timeout_ms = 250

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.harness.wait_timeout_ms, 250);
        assert_eq!(config.harness.test_id_attribute, "data-testid");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_unknown_format_rejected() {
        let result: Result<Config, _> = toml::from_str("[logging]\nformat = \"xml\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_roundtrip() {
        let mut config = Config::default();
        config.tags.filter = Some("smoke,^slow".to_string());
        let text = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
