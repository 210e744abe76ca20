//! Converter output.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use trestle_core::PageState;

/// The normalized output of a converter.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedPayload {
    /// The converted body.
    pub body: Value,
    /// Converter metadata (`count`, `pagination`).
    pub metadata: Map<String, Value>,
    /// The envelope key for the body.
    pub response_key: String,
}

/// Pagination metadata rendered under the `pagination` key.
///
/// `previous` is null iff `current <= 1`; `next` is null iff
/// `current >= pages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// The current page.
    pub current: u64,
    /// The previous page.
    pub previous: Option<u64>,
    /// The next page.
    pub next: Option<u64>,
    /// Items per page.
    pub per_page: u64,
    /// Total items.
    pub count: u64,
    /// Total pages.
    pub pages: u64,
}

impl From<PageState> for Pagination {
    fn from(state: PageState) -> Self {
        Self {
            current: state.current,
            previous: state.previous(),
            next: state.next(),
            per_page: state.per_page,
            count: state.count,
            pages: state.pages,
        }
    }
}

impl Pagination {
    /// Renders the pagination as a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "current": self.current,
            "previous": self.previous,
            "next": self.next,
            "per_page": self.per_page,
            "count": self.count,
            "pages": self.pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_page_state() {
        let pagination = Pagination::from(PageState::with_pages(2, 10, 200, 20));
        assert_eq!(
            pagination.to_value(),
            json!({"current": 2, "previous": 1, "next": 3, "per_page": 10, "count": 200, "pages": 20})
        );
    }

    #[test]
    fn test_edges_are_null() {
        let first = Pagination::from(PageState::new(1, 10, 30));
        assert_eq!(first.previous, None);
        let last = Pagination::from(PageState::new(3, 10, 30));
        assert_eq!(last.next, None);
        assert_eq!(last.to_value()["next"], Value::Null);
    }
}
