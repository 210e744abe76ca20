//! `Link` response headers.

use http::header::LINK;
use http::{HeaderMap, HeaderValue};
use serde_json::Value;

/// Formats one link: `<uri>; rel="rel"` followed by `; key="value"` attributes.
#[must_use]
pub fn format_link(rel: &str, uri: &str, attributes: &[(&str, &str)]) -> String {
    let mut link = format!("<{uri}>; rel=\"{rel}\"");
    for (key, value) in attributes {
        link.push_str(&format!("; {key}=\"{value}\""));
    }
    link
}

/// Links collected while handling a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Links {
    entries: Vec<String>,
}

impl Links {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a link.
    pub fn link(&mut self, rel: &str, uri: &str, attributes: &[(&str, &str)]) {
        self.entries.push(format_link(rel, uri, attributes));
    }

    /// Adds each `(rel, uri)` pair; pairs without a uri are skipped.
    pub fn links<'a, I>(&mut self, links: I)
    where
        I: IntoIterator<Item = (&'a str, Option<String>)>,
    {
        for (rel, uri) in links {
            if let Some(uri) = uri {
                self.link(rel, &uri, &[]);
            }
        }
    }

    /// The formatted links, in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Returns true if no link was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends one `Link` header per entry.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for entry in &self.entries {
            match HeaderValue::from_str(entry) {
                Ok(value) => {
                    headers.append(LINK, value);
                }
                Err(e) => tracing::warn!(link = %entry, error = %e, "skipping invalid link"),
            }
        }
    }
}

/// Navigation links for a `pagination` metadata object.
///
/// Yields `next`, `prev`, `last` and `first` in that order; `page_url`
/// returning `None` drops the link.
pub fn pagination_links<F>(pagination: &Value, page_url: F) -> Vec<(&'static str, Option<String>)>
where
    F: Fn(u64) -> Option<String>,
{
    let page = |key: &str| pagination.get(key).and_then(Value::as_u64);
    vec![
        ("next", page("next").and_then(&page_url)),
        ("prev", page("previous").and_then(&page_url)),
        ("last", page("pages").and_then(&page_url)),
        ("first", page_url(1)),
    ]
}
