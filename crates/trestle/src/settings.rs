//! The runtime settings snapshot.
//!
//! [`Settings`] is built once from a [`TrestleConfig`] and shared by `Arc`
//! between requests. Every request reads the same immutable snapshot; tests
//! adjust individual flags with the `with_*` methods before building an app.

use crate::error::TrestleError;
use crate::i18n::Translations;
use crate::versioning::VersionSource;
use http::HeaderName;
use std::time::Duration;
use trestle_cache::EtagCache;
use trestle_config::{TrestleConfig, VersioningStrategy};
use trestle_router::{HeaderVersion, RouteError};

/// Process-wide flags and collaborators, read once per request.
#[derive(Debug, Clone)]
pub struct Settings {
    env: String,
    caching_enabled: bool,
    header_metadata: bool,
    serializers_enabled: bool,
    pass_through_errors: bool,
    show_exception_message: bool,
    cache: EtagCache,
    max_age: Duration,
    cache_control: Vec<String>,
    versioning: VersionSource,
    jsonp_parameter: Option<String>,
    translations: Translations,
}

impl Settings {
    /// Settings for the named environment with every other option defaulted.
    ///
    /// ```
    /// use trestle::Settings;
    ///
    /// let production = Settings::for_environment("production");
    /// assert!(production.caching_enabled());
    /// assert!(!production.pass_through_errors());
    ///
    /// let test = Settings::for_environment("test");
    /// assert!(!test.caching_enabled());
    /// assert!(test.show_exception_message());
    /// ```
    #[must_use]
    pub fn for_environment(env: impl Into<String>) -> Self {
        let config = TrestleConfig {
            env: Some(env.into()),
            ..TrestleConfig::default()
        };
        Self::base(&config)
    }

    /// Builds the snapshot from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TrestleError::Route`] when header versioning names an
    /// invalid header or pattern.
    pub fn from_config(config: &TrestleConfig) -> Result<Self, TrestleError> {
        let mut settings = Self::base(config);
        if config.versioning.strategy == VersioningStrategy::Header {
            let header = HeaderName::try_from(config.versioning.header.as_str()).map_err(|e| {
                RouteError::invalid_pattern(config.versioning.header.clone(), e.to_string())
            })?;
            settings.versioning =
                VersionSource::Header(HeaderVersion::new(header, &config.versioning.pattern)?);
        }
        tracing::debug!(
            env = %settings.env,
            caching_enabled = settings.caching_enabled,
            pass_through_errors = settings.pass_through_errors,
            header_versioning = settings.versioning.is_header(),
            "built settings"
        );
        Ok(settings)
    }

    fn base(config: &TrestleConfig) -> Self {
        Self {
            env: config.environment(),
            caching_enabled: config.caching_enabled(),
            header_metadata: config.header_metadata,
            serializers_enabled: config.serializers_enabled,
            pass_through_errors: config.pass_through_errors(),
            show_exception_message: config.show_exception_message(),
            cache: EtagCache::in_memory(),
            max_age: Duration::from_secs(config.caching.max_age_secs),
            cache_control: config.caching.cache_control.clone(),
            versioning: VersionSource::Path,
            jsonp_parameter: config
                .jsonp
                .enabled
                .then(|| config.jsonp.parameter.clone()),
            translations: Translations::english(),
        }
    }

    /// The environment name.
    #[must_use]
    pub fn env(&self) -> &str {
        &self.env
    }

    /// Whether conditional GET and response caching are active.
    #[must_use]
    pub fn caching_enabled(&self) -> bool {
        self.caching_enabled
    }

    /// Whether envelope metadata is mirrored into `X-Api-*` headers.
    #[must_use]
    pub fn header_metadata(&self) -> bool {
        self.header_metadata
    }

    /// Whether objects' own serializers are consulted.
    #[must_use]
    pub fn serializers_enabled(&self) -> bool {
        self.serializers_enabled
    }

    /// Whether unmapped failures bypass error rendering.
    #[must_use]
    pub fn pass_through_errors(&self) -> bool {
        self.pass_through_errors
    }

    /// Whether failure messages reach clients.
    #[must_use]
    pub fn show_exception_message(&self) -> bool {
        self.show_exception_message
    }

    /// The ETag cache.
    #[must_use]
    pub fn cache(&self) -> &EtagCache {
        &self.cache
    }

    /// Default `max-age` for cached collections.
    #[must_use]
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Default `Cache-Control` directives.
    #[must_use]
    pub fn cache_control(&self) -> &[String] {
        &self.cache_control
    }

    /// The version source.
    #[must_use]
    pub fn versioning(&self) -> &VersionSource {
        &self.versioning
    }

    /// The JSONP callback parameter, when JSONP is enabled.
    #[must_use]
    pub fn jsonp_parameter(&self) -> Option<&str> {
        self.jsonp_parameter.as_deref()
    }

    /// Error message translations.
    #[must_use]
    pub fn translations(&self) -> &Translations {
        &self.translations
    }

    /// Overrides the caching flag.
    #[must_use]
    pub fn with_caching_enabled(mut self, enabled: bool) -> Self {
        self.caching_enabled = enabled;
        self
    }

    /// Overrides the header metadata flag.
    #[must_use]
    pub fn with_header_metadata(mut self, enabled: bool) -> Self {
        self.header_metadata = enabled;
        self
    }

    /// Overrides the serializer lookup flag.
    #[must_use]
    pub fn with_serializers_enabled(mut self, enabled: bool) -> Self {
        self.serializers_enabled = enabled;
        self
    }

    /// Overrides the pass-through flag.
    #[must_use]
    pub fn with_pass_through_errors(mut self, enabled: bool) -> Self {
        self.pass_through_errors = enabled;
        self
    }

    /// Overrides the exception message flag.
    #[must_use]
    pub fn with_show_exception_message(mut self, enabled: bool) -> Self {
        self.show_exception_message = enabled;
        self
    }

    /// Replaces the ETag cache, e.g. with one over a shared store.
    #[must_use]
    pub fn with_cache(mut self, cache: EtagCache) -> Self {
        self.cache = cache;
        self
    }

    /// Overrides the collection `max-age`.
    #[must_use]
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Overrides the version source.
    #[must_use]
    pub fn with_versioning(mut self, versioning: VersionSource) -> Self {
        self.versioning = versioning;
        self
    }

    /// Enables JSONP with `parameter`, or disables it with `None`.
    #[must_use]
    pub fn with_jsonp(mut self, parameter: Option<String>) -> Self {
        self.jsonp_parameter = parameter;
        self
    }

    /// Replaces the translations.
    #[must_use]
    pub fn with_translations(mut self, translations: Translations) -> Self {
        self.translations = translations;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trestle_config::ConfigLoader;

    #[test]
    fn test_environment_defaults() {
        let dev = Settings::for_environment("development");
        assert_eq!(dev.env(), "development");
        assert!(dev.pass_through_errors());
        assert!(dev.show_exception_message());
        assert!(!dev.caching_enabled());
        assert!(dev.serializers_enabled());
        assert!(!dev.header_metadata());
        assert_eq!(dev.max_age(), Duration::from_secs(300));
        assert_eq!(dev.cache_control(), ["public"]);
        assert!(dev.jsonp_parameter().is_none());
        assert!(!dev.versioning().is_header());

        let staging = Settings::for_environment("staging");
        assert!(!staging.pass_through_errors());
        assert!(!staging.caching_enabled());
    }

    #[test]
    fn test_from_config_header_versioning() {
        let config = ConfigLoader::new()
            .with_string(
                r#"
                env = "production"
                header_metadata = true

                [versioning]
                strategy = "header"

                [jsonp]
                enabled = true
                parameter = "cb"
                "#,
                "toml",
            )
            .unwrap()
            .load()
            .unwrap();

        let settings = Settings::from_config(&config).unwrap();
        assert!(settings.versioning().is_header());
        assert!(settings.header_metadata());
        assert_eq!(settings.jsonp_parameter(), Some("cb"));
        assert!(settings.caching_enabled());
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::for_environment("production")
            .with_caching_enabled(false)
            .with_pass_through_errors(true)
            .with_max_age(Duration::from_secs(60))
            .with_jsonp(Some("callback".into()));
        assert!(!settings.caching_enabled());
        assert!(settings.pass_through_errors());
        assert_eq!(settings.max_age().as_secs(), 60);
        assert_eq!(settings.jsonp_parameter(), Some("callback"));
    }
}
