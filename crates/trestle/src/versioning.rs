//! Controller version ranges and request version resolution.

use http::HeaderMap;
use std::fmt;
use std::ops::RangeInclusive;
use trestle_router::{extract_version, HeaderVersion, RouteParams, VersionPrefix};

/// The inclusive range of API versions a controller accepts.
///
/// ```
/// use trestle::VersionRange;
///
/// let range = VersionRange::from(1..=2);
/// assert!(range.contains(1));
/// assert!(range.contains(2));
/// assert!(!range.contains(3));
/// assert_eq!(VersionRange::from(4), VersionRange::new(4, 4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionRange {
    start: u32,
    end: u32,
}

impl VersionRange {
    /// Creates `start..=end`.
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Creates `version..=version`.
    #[must_use]
    pub const fn single(version: u32) -> Self {
        Self::new(version, version)
    }

    /// The lowest accepted version.
    #[must_use]
    pub const fn start(&self) -> u32 {
        self.start
    }

    /// The highest accepted version.
    #[must_use]
    pub const fn end(&self) -> u32 {
        self.end
    }

    /// Returns true if `version` lies within the range, both ends included.
    #[must_use]
    pub const fn contains(&self, version: u32) -> bool {
        self.start <= version && version <= self.end
    }
}

impl From<u32> for VersionRange {
    fn from(version: u32) -> Self {
        Self::single(version)
    }
}

impl From<RangeInclusive<u32>> for VersionRange {
    fn from(range: RangeInclusive<u32>) -> Self {
        Self::new(*range.start(), *range.end())
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}..{}", self.start, self.end)
        }
    }
}

/// Where request versions come from.
#[derive(Debug, Clone, Default)]
pub enum VersionSource {
    /// The first path segment, optionally behind a literal prefix.
    #[default]
    Path,
    /// A header matched against a pattern.
    Header(HeaderVersion),
}

impl VersionSource {
    /// Resolves the request version.
    ///
    /// Returns `None` for a missing or malformed token.
    #[must_use]
    pub fn resolve(
        &self,
        params: &RouteParams,
        prefix: Option<&VersionPrefix>,
        headers: &HeaderMap,
    ) -> Option<u32> {
        match self {
            Self::Path => extract_version(params.version(), prefix),
            Self::Header(header) => header.extract(headers),
        }
    }

    /// Returns true for header versioning.
    #[must_use]
    pub fn is_header(&self) -> bool {
        matches!(self, Self::Header(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn params(token: &str) -> RouteParams {
        let mut params = RouteParams::new();
        params.push("version", token);
        params
    }

    fn resolve(token: &str, prefix: Option<&VersionPrefix>) -> Option<u32> {
        VersionSource::Path.resolve(&params(token), prefix, &HeaderMap::new())
    }

    #[test]
    fn test_range_membership() {
        let range = VersionRange::from(1..=2);
        assert!(resolve("1", None).is_some_and(|v| range.contains(v)));
        assert!(!resolve("3", None).is_some_and(|v| range.contains(v)));
        assert_eq!(range.to_string(), "1..2");
        assert_eq!(VersionRange::single(3).to_string(), "3");
    }

    #[test]
    fn test_malformed_tokens() {
        assert_eq!(resolve("1.1", None), None);
        assert_eq!(resolve("v1", None), None);
        assert_eq!(resolve("", None), None);
        assert_eq!(
            VersionSource::Path.resolve(&RouteParams::new(), None, &HeaderMap::new()),
            None
        );
    }

    #[test]
    fn test_required_prefix() {
        let prefix = VersionPrefix::required("v");
        assert_eq!(resolve("v1", Some(&prefix)), Some(1));
        assert_eq!(resolve("1", Some(&prefix)), None);

        let optional = VersionPrefix::optional("v");
        assert_eq!(resolve("1", Some(&optional)), Some(1));
        assert_eq!(resolve("v2", Some(&optional)), Some(2));
    }

    #[test]
    fn test_header_source() {
        let source = VersionSource::Header(HeaderVersion::accept().unwrap());
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::ACCEPT,
            HeaderValue::from_static("application/vnd.api.v2+json"),
        );
        assert!(source.is_header());
        assert_eq!(source.resolve(&params("9"), None, &headers), Some(2));
        assert_eq!(source.resolve(&params("9"), None, &HeaderMap::new()), None);
    }
}
