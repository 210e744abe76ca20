//! The root configuration type.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    CachingConfig, ConfigError, JsonpConfig, LoggingConfig, VersioningConfig, VersioningStrategy,
};

/// Environment variables consulted, in order, when `env` is unset.
pub const ENV_VARS: [&str; 2] = ["TRESTLE_ENV", "APP_ENV"];

/// Environment assumed when nothing names one.
pub const DEFAULT_ENV: &str = "development";

/// Complete Trestle configuration.
///
/// Flags left unset are resolved against the environment by the accessor
/// methods: caching is on in production, errors pass through and exception
/// messages are shown in development and test.
///
/// ```
/// use trestle_config::TrestleConfig;
///
/// let config = TrestleConfig {
///     env: Some("production".into()),
///     ..TrestleConfig::default()
/// };
/// assert!(config.caching_enabled());
/// assert!(!config.pass_through_errors());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TrestleConfig {
    /// Environment name.
    #[serde(default)]
    pub env: Option<String>,

    /// Whether conditional GET and response caching are active.
    #[serde(default)]
    pub caching_enabled: Option<bool>,

    /// Whether envelope metadata is mirrored into `X-Api-*` headers.
    #[serde(default)]
    pub header_metadata: bool,

    /// Whether objects' own serializers are consulted.
    #[serde(default = "default_true")]
    pub serializers_enabled: bool,

    /// Whether unmapped failures propagate instead of being rendered.
    #[serde(default)]
    pub pass_through_errors: Option<bool>,

    /// Whether failure messages reach clients.
    #[serde(default)]
    pub show_exception_message: Option<bool>,

    /// Collection caching.
    #[serde(default)]
    pub caching: CachingConfig,

    /// Version negotiation.
    #[serde(default)]
    pub versioning: VersioningConfig,

    /// JSONP.
    #[serde(default)]
    pub jsonp: JsonpConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TrestleConfig {
    fn default() -> Self {
        Self {
            env: None,
            caching_enabled: None,
            header_metadata: false,
            serializers_enabled: true,
            pass_through_errors: None,
            show_exception_message: None,
            caching: CachingConfig::default(),
            versioning: VersioningConfig::default(),
            jsonp: JsonpConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

impl TrestleConfig {
    /// The environment name: `env`, then the process environment.
    #[must_use]
    pub fn environment(&self) -> String {
        self.env
            .clone()
            .unwrap_or_else(|| detect_environment(|name| std::env::var(name).ok()))
    }

    /// Returns true in development and test environments.
    #[must_use]
    pub fn is_development_like(&self) -> bool {
        matches!(self.environment().as_str(), "development" | "test")
    }

    /// Whether caching is active; defaults to production only.
    #[must_use]
    pub fn caching_enabled(&self) -> bool {
        self.caching_enabled
            .unwrap_or_else(|| self.environment() == "production")
    }

    /// Whether unmapped failures propagate.
    #[must_use]
    pub fn pass_through_errors(&self) -> bool {
        self.pass_through_errors
            .unwrap_or_else(|| self.is_development_like())
    }

    /// Whether failure messages reach clients.
    #[must_use]
    pub fn show_exception_message(&self) -> bool {
        self.show_exception_message
            .unwrap_or_else(|| self.is_development_like())
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if:
    /// - `caching.max_age_secs` is zero
    /// - the header strategy's pattern does not compile or has no capture group
    /// - the header strategy names an empty header
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.caching.max_age_secs == 0 {
            return Err(ConfigError::invalid_value(
                "caching.max_age_secs",
                "must be greater than zero",
            ));
        }

        if self.versioning.strategy == VersioningStrategy::Header {
            if self.versioning.header.trim().is_empty() {
                return Err(ConfigError::invalid_value(
                    "versioning.header",
                    "must name a header",
                ));
            }
            let pattern = Regex::new(&self.versioning.pattern)
                .map_err(|e| ConfigError::invalid_value("versioning.pattern", e.to_string()))?;
            if pattern.captures_len() < 2 {
                return Err(ConfigError::invalid_value(
                    "versioning.pattern",
                    "must contain a capture group for the version",
                ));
            }
        }

        if self.jsonp.enabled && self.jsonp.parameter.is_empty() {
            return Err(ConfigError::invalid_value(
                "jsonp.parameter",
                "must not be empty",
            ));
        }

        Ok(())
    }
}

/// Resolves the environment name from `lookup`, trying each of [`ENV_VARS`].
pub fn detect_environment<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    ENV_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_ENV.to_string())
}
