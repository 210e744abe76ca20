//! Route path patterns.

use crate::error::RouteError;
use crate::params::RouteParams;

/// One segment of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matches the literal text.
    Static(String),
    /// Matches any one segment, captured under the name.
    Param(String),
    /// Matches the rest of the path, captured under the name.
    Wildcard(String),
}

/// A parsed route path such as `/users/{id}` or `/files/*path`.
///
/// Empty segments are ignored on both sides, so trailing slashes are
/// normalised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parses a route path.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPath`] for unnamed parameters and for a
    /// wildcard that is not the last segment.
    pub fn parse(path: &str) -> Result<Self, RouteError> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(parts.len());

        for (index, part) in parts.iter().enumerate() {
            let segment = if let Some(name) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                if name.is_empty() {
                    return Err(RouteError::invalid_path(path, "unnamed parameter"));
                }
                Segment::Param(name.to_string())
            } else if let Some(name) = part.strip_prefix('*') {
                if index + 1 != parts.len() {
                    return Err(RouteError::invalid_path(path, "wildcard must be last"));
                }
                Segment::Wildcard(if name.is_empty() { "path" } else { name }.to_string())
            } else {
                Segment::Static((*part).to_string())
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: path.to_string(),
            segments,
        })
    }

    /// The path as declared.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Matches path segments, appending captures to `params`.
    #[must_use]
    pub fn matches(&self, parts: &[&str], params: &mut RouteParams) -> bool {
        let mut captured = Vec::new();
        let mut index = 0;
        for segment in &self.segments {
            match segment {
                Segment::Static(text) => {
                    if parts.get(index) != Some(&text.as_str()) {
                        return false;
                    }
                }
                Segment::Param(name) => match parts.get(index) {
                    Some(value) => captured.push((name.clone(), (*value).to_string())),
                    None => return false,
                },
                Segment::Wildcard(name) => {
                    if index >= parts.len() {
                        return false;
                    }
                    captured.push((name.clone(), parts[index..].join("/")));
                    index = parts.len();
                    continue;
                }
            }
            index += 1;
        }
        if index != parts.len() {
            return false;
        }
        for (name, value) in captured {
            params.push(name, value);
        }
        true
    }
}
