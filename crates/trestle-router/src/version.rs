//! Version token resolution.
//!
//! A request version comes either from the version path segment, optionally
//! behind a literal prefix such as `v`, or from a header matched against a
//! pattern with one capture group. Anything that does not resolve to a
//! positive integer is "no version".

use crate::error::RouteError;
use http::header::{HeaderMap, HeaderName};
use regex::Regex;

/// The literal prefix allowed or required before a path version token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionPrefix {
    text: String,
    required: bool,
}

impl VersionPrefix {
    /// A prefix that may precede the version.
    pub fn optional(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            required: false,
        }
    }

    /// A prefix that must precede the version.
    pub fn required(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            required: true,
        }
    }

    /// The prefix text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the prefix is mandatory.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Removes the prefix from `token`.
    ///
    /// Returns `None` when the prefix is required but absent.
    #[must_use]
    pub fn strip<'t>(&self, token: &'t str) -> Option<&'t str> {
        match token.strip_prefix(self.text.as_str()) {
            Some(rest) => Some(rest),
            None if self.required => None,
            None => Some(token),
        }
    }
}

/// Parses a bare version token: ASCII digits only, greater than zero.
#[must_use]
pub fn parse_version(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse::<u32>().ok().filter(|version| *version > 0)
}

/// Resolves a raw path token to a version, stripping `prefix` first.
///
/// ```rust
/// use trestle_router::{extract_version, VersionPrefix};
///
/// let v = VersionPrefix::required("v");
/// assert_eq!(extract_version(Some("v1"), Some(&v)), Some(1));
/// assert_eq!(extract_version(Some("1"), Some(&v)), None);
/// assert_eq!(extract_version(Some("1.1"), None), None);
/// assert_eq!(extract_version(None, None), None);
/// ```
#[must_use]
pub fn extract_version(token: Option<&str>, prefix: Option<&VersionPrefix>) -> Option<u32> {
    let token = token?;
    let bare = match prefix {
        Some(prefix) => prefix.strip(token)?,
        None => token,
    };
    parse_version(bare)
}

/// Header-based version extraction.
#[derive(Debug, Clone)]
pub struct HeaderVersion {
    header: HeaderName,
    pattern: Regex,
}

impl HeaderVersion {
    /// Default media type pattern: `application/vnd.api.v{N}+json`.
    pub const DEFAULT_PATTERN: &'static str = r"application/vnd\.api\.v(\d+)\+json";

    /// Creates an extractor reading `header` with a pattern whose first
    /// capture group is the version.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPattern`] when the pattern does not
    /// compile or has no capture group.
    pub fn new(header: HeaderName, pattern: &str) -> Result<Self, RouteError> {
        let regex =
            Regex::new(pattern).map_err(|e| RouteError::invalid_pattern(pattern, e.to_string()))?;
        if regex.captures_len() < 2 {
            return Err(RouteError::invalid_pattern(
                pattern,
                "pattern needs a capture group for the version",
            ));
        }
        Ok(Self {
            header,
            pattern: regex,
        })
    }

    /// Extractor for the `Accept` header with [`Self::DEFAULT_PATTERN`].
    ///
    /// # Errors
    ///
    /// Never fails in practice; the default pattern is valid.
    pub fn accept() -> Result<Self, RouteError> {
        Self::new(http::header::ACCEPT, Self::DEFAULT_PATTERN)
    }

    /// The header inspected.
    #[must_use]
    pub fn header(&self) -> &HeaderName {
        &self.header
    }

    /// The raw version token found in `headers`.
    #[must_use]
    pub fn token<'h>(&self, headers: &'h HeaderMap) -> Option<&'h str> {
        let value = headers.get(&self.header)?.to_str().ok()?;
        self.pattern
            .captures(value)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str())
    }

    /// The version found in `headers`.
    #[must_use]
    pub fn extract(&self, headers: &HeaderMap) -> Option<u32> {
        self.token(headers).and_then(parse_version)
    }
}
