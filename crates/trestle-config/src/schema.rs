//! Configuration sections.

use serde::{Deserialize, Serialize};
use trestle_telemetry::LogConfig;

/// Default collection `max-age`, in seconds.
pub const DEFAULT_MAX_AGE_SECS: u64 = 300;

/// Default header version pattern.
pub const DEFAULT_VERSION_PATTERN: &str = r"application/vnd\.api\.v(\d+)\+json";

/// Time-based caching of collection responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CachingConfig {
    /// `max-age` for cached collection responses.
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,

    /// Extra `Cache-Control` directives.
    #[serde(default = "default_cache_control")]
    pub cache_control: Vec<String>,
}

impl Default for CachingConfig {
    fn default() -> Self {
        Self {
            max_age_secs: default_max_age(),
            cache_control: default_cache_control(),
        }
    }
}

fn default_max_age() -> u64 {
    DEFAULT_MAX_AGE_SECS
}

fn default_cache_control() -> Vec<String> {
    vec!["public".to_string()]
}

/// Where the API version is read from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VersioningStrategy {
    /// The `version` path segment, with optional prefix.
    #[default]
    Path,
    /// A request header matched against a pattern.
    Header,
}

/// Version negotiation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct VersioningConfig {
    /// Path or header versioning.
    #[serde(default)]
    pub strategy: VersioningStrategy,

    /// Header consulted by the header strategy.
    #[serde(default = "default_version_header")]
    pub header: String,

    /// Pattern whose first capture group is the version token.
    #[serde(default = "default_version_pattern")]
    pub pattern: String,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            strategy: VersioningStrategy::default(),
            header: default_version_header(),
            pattern: default_version_pattern(),
        }
    }
}

fn default_version_header() -> String {
    "accept".to_string()
}

fn default_version_pattern() -> String {
    DEFAULT_VERSION_PATTERN.to_string()
}

/// JSONP wrapping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct JsonpConfig {
    /// Whether the JSONP stage is installed.
    #[serde(default)]
    pub enabled: bool,

    /// Query parameter naming the callback.
    #[serde(default = "default_jsonp_parameter")]
    pub parameter: String,
}

impl Default for JsonpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            parameter: default_jsonp_parameter(),
        }
    }
}

fn default_jsonp_parameter() -> String {
    "callback".to_string()
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable output.
    Pretty,
}

/// Logging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
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

impl LoggingConfig {
    /// The telemetry logging configuration for this section.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        let base = match self.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::development(),
        };
        base.with_level(self.level.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caching_defaults() {
        let caching = CachingConfig::default();
        assert_eq!(caching.max_age_secs, 300);
        assert_eq!(caching.cache_control, ["public"]);
    }

    #[test]
    fn test_strategy_names() {
        let versioning: VersioningConfig = toml::from_str("strategy = \"header\"").unwrap();
        assert_eq!(versioning.strategy, VersioningStrategy::Header);
        assert_eq!(versioning.header, "accept");
    }

    #[test]
    fn test_log_config_conversion() {
        let logging = LoggingConfig {
            level: "trestle=debug".to_string(),
            format: LogFormat::Pretty,
        };
        let log = logging.to_log_config();
        assert!(!log.json_format);
        assert_eq!(log.level, "trestle=debug");
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: Result<JsonpConfig, _> = toml::from_str("enabled = true\ncallbak = \"cb\"");
        assert!(result.is_err());
    }
}
