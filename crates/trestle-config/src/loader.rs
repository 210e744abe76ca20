//! Layered configuration loading.

use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, LogFormat, TrestleConfig, VersioningStrategy};

/// Loads a [`TrestleConfig`] in layers, later layers overriding earlier ones:
///
/// 1. Built-in defaults
/// 2. A TOML or JSON file (or string)
/// 3. `PREFIX__SECTION__KEY` environment variables
///
/// ```no_run
/// use trestle_config::ConfigLoader;
///
/// # fn main() -> Result<(), trestle_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_optional_file("trestle.toml")?
///     .with_env_prefix("TRESTLE")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: TrestleConfig,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Creates a loader holding the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets to the built-in defaults.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = TrestleConfig::default();
        self
    }

    /// Loads a `.toml` or `.json` file.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing, unreadable, malformed, has an unknown
    /// extension or contains unknown fields.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        self.config = match extension.as_deref() {
            Some("toml") => toml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            _ => {
                return Err(ConfigError::validation_error(format!(
                    "unsupported configuration file format: {}",
                    path.display()
                )))
            }
        };

        Ok(self)
    }

    /// Loads a file if it exists.
    ///
    /// # Errors
    ///
    /// Fails as [`with_file`](Self::with_file) does when the file exists.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Loads configuration from a string in `format` (`toml` or `json`).
    ///
    /// ```
    /// use trestle_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("env = \"test\"\n[jsonp]\nenabled = true", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(config.jsonp.enabled);
    /// assert_eq!(config.jsonp.parameter, "callback");
    /// ```
    ///
    /// # Errors
    ///
    /// Fails on malformed content or an unsupported format.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::validation_error(format!(
                    "unsupported configuration format: {format}"
                )))
            }
        };
        Ok(self)
    }

    /// Applies `PREFIX__...` environment variables when loading.
    ///
    /// For the prefix `TRESTLE`:
    /// - `TRESTLE__ENV=production`
    /// - `TRESTLE__CACHING_ENABLED=true`
    /// - `TRESTLE__CACHING__MAX_AGE_SECS=60`
    /// - `TRESTLE__VERSIONING__STRATEGY=header`
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Loads variables from a `.env` file, if one exists.
    ///
    /// # Errors
    ///
    /// Fails if a `.env` file exists but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Applies environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Fails on an unparsable environment variable or invalid configuration.
    pub fn load(mut self) -> Result<TrestleConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Returns the configuration without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> TrestleConfig {
        self.config
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let marker = format!("{prefix}__");
        let mut vars: Vec<(String, String)> = env::vars()
            .filter(|(k, _)| k.starts_with(&marker))
            .collect();
        vars.sort();

        for (key, value) in vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();
        let boolean = || {
            parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))
        };

        match parts.as_slice() {
            ["ENV"] => {
                self.config.env = (!value.is_empty()).then(|| value.to_string());
            }
            ["CACHING_ENABLED"] => self.config.caching_enabled = Some(boolean()?),
            ["HEADER_METADATA"] => self.config.header_metadata = boolean()?,
            ["SERIALIZERS_ENABLED"] => self.config.serializers_enabled = boolean()?,
            ["PASS_THROUGH_ERRORS"] => self.config.pass_through_errors = Some(boolean()?),
            ["SHOW_EXCEPTION_MESSAGE"] => self.config.show_exception_message = Some(boolean()?),

            ["CACHING", "MAX_AGE_SECS"] => {
                self.config.caching.max_age_secs = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            ["CACHING", "CACHE_CONTROL"] => {
                self.config.caching.cache_control = value
                    .split(',')
                    .map(str::trim)
                    .filter(|directive| !directive.is_empty())
                    .map(str::to_string)
                    .collect();
            }

            ["VERSIONING", "STRATEGY"] => {
                self.config.versioning.strategy = match value.to_lowercase().as_str() {
                    "path" => VersioningStrategy::Path,
                    "header" => VersioningStrategy::Header,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'path' or 'header'",
                        ))
                    }
                };
            }
            ["VERSIONING", "HEADER"] => self.config.versioning.header = value.to_string(),
            ["VERSIONING", "PATTERN"] => self.config.versioning.pattern = value.to_string(),

            ["JSONP", "ENABLED"] => self.config.jsonp.enabled = boolean()?,
            ["JSONP", "PARAMETER"] => self.config.jsonp.parameter = value.to_string(),

            ["LOGGING", "LEVEL"] => self.config.logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }

            _ => {}
        }

        Ok(())
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
