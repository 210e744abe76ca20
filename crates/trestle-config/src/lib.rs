//! Typed configuration for Trestle APIs.
//!
//! - TOML and JSON configuration files
//! - `PREFIX__SECTION__KEY` environment variable overrides
//! - Strict parsing (unknown fields are errors)
//! - Environment-dependent defaults for unset flags
//!
//! # Configuration File Format
//!
//! ```toml
//! env = "production"
//! caching_enabled = true
//! header_metadata = false
//! serializers_enabled = true
//! pass_through_errors = false
//! show_exception_message = false
//!
//! [caching]
//! max_age_secs = 300
//! cache_control = ["public"]
//!
//! [versioning]
//! strategy = "path"
//! header = "accept"
//! pattern = 'application/vnd\.api\.v(\d+)\+json'
//!
//! [jsonp]
//! enabled = false
//! parameter = "callback"
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! # Example
//!
//! ```no_run
//! use trestle_config::ConfigLoader;
//!
//! # fn main() -> Result<(), trestle_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_dotenv()?
//!     .with_optional_file("trestle.toml")?
//!     .with_env_prefix("TRESTLE")
//!     .load()?;
//!
//! println!("caching enabled: {}", config.caching_enabled());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{detect_environment, TrestleConfig, DEFAULT_ENV, ENV_VARS};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{
    CachingConfig, JsonpConfig, LogFormat, LoggingConfig, VersioningConfig, VersioningStrategy,
    DEFAULT_MAX_AGE_SECS, DEFAULT_VERSION_PATTERN,
};
