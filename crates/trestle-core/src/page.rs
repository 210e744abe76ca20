//! Page state for paginated collections.
//!
//! Two pagination styles are recognised: will_paginate-style collections
//! (total entries, per page) and kaminari-style collections (current page,
//! number of pages, limit value). Both report a [`PageState`].

use crate::resource::Exposable;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The page position of a paginated collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    /// The current page, starting at 1.
    pub current: u64,
    /// Items per page.
    pub per_page: u64,
    /// Total number of items across all pages.
    pub count: u64,
    /// Total number of pages.
    pub pages: u64,
}

impl PageState {
    /// Creates a page state, deriving the page count from `count / per_page`.
    #[must_use]
    pub fn new(current: u64, per_page: u64, count: u64) -> Self {
        let pages = if per_page == 0 {
            0
        } else {
            count.div_ceil(per_page)
        };
        Self {
            current,
            per_page,
            count,
            pages,
        }
    }

    /// Creates a page state with an explicit page count.
    #[must_use]
    pub fn with_pages(current: u64, per_page: u64, count: u64, pages: u64) -> Self {
        Self {
            current,
            per_page,
            count,
            pages,
        }
    }

    /// The previous page, absent on the first page.
    #[must_use]
    pub fn previous(&self) -> Option<u64> {
        (self.current > 1).then(|| self.current - 1)
    }

    /// The next page, absent on or past the last page.
    #[must_use]
    pub fn next(&self) -> Option<u64> {
        (self.current < self.pages).then(|| self.current + 1)
    }
}

/// A page of records in will_paginate style.
#[derive(Debug, Clone, PartialEq)]
pub struct WillPaginatePage<T> {
    /// Records on this page.
    pub items: Vec<T>,
    /// The current page, starting at 1.
    pub current_page: u64,
    /// Records per page.
    pub per_page: u64,
    /// Total records across all pages.
    pub total_entries: u64,
}

impl<T> WillPaginatePage<T> {
    /// Creates a page.
    #[must_use]
    pub fn new(items: Vec<T>, current_page: u64, per_page: u64, total_entries: u64) -> Self {
        Self {
            items,
            current_page,
            per_page,
            total_entries,
        }
    }
}

impl<T: Exposable> Exposable for WillPaginatePage<T> {
    fn to_json(&self) -> Value {
        Value::Array(self.items.iter().map(Exposable::to_json).collect())
    }

    fn elements(&self) -> Option<Vec<&dyn Exposable>> {
        Some(self.items.iter().map(|item| item as &dyn Exposable).collect())
    }

    fn will_paginate(&self) -> Option<PageState> {
        Some(PageState::new(
            self.current_page,
            self.per_page,
            self.total_entries,
        ))
    }
}

/// A page of records in kaminari style.
#[derive(Debug, Clone, PartialEq)]
pub struct KaminariPage<T> {
    /// Records on this page.
    pub items: Vec<T>,
    /// The current page, starting at 1.
    pub current_page: u64,
    /// Total number of pages.
    pub num_pages: u64,
    /// Records per page.
    pub limit_value: u64,
    /// Total records across all pages.
    pub total_count: u64,
}

impl<T> KaminariPage<T> {
    /// Creates a page; the page count is derived from the totals.
    #[must_use]
    pub fn new(items: Vec<T>, current_page: u64, limit_value: u64, total_count: u64) -> Self {
        let num_pages = PageState::new(current_page, limit_value, total_count).pages;
        Self {
            items,
            current_page,
            num_pages,
            limit_value,
            total_count,
        }
    }
}

impl<T: Exposable> Exposable for KaminariPage<T> {
    fn to_json(&self) -> Value {
        Value::Array(self.items.iter().map(Exposable::to_json).collect())
    }

    fn elements(&self) -> Option<Vec<&dyn Exposable>> {
        Some(self.items.iter().map(|item| item as &dyn Exposable).collect())
    }

    fn kaminari(&self) -> Option<PageState> {
        Some(PageState::with_pages(
            self.current_page,
            self.limit_value,
            self.total_count,
            self.num_pages,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_page_has_no_previous() {
        let state = PageState::new(1, 10, 200);
        assert_eq!(state.pages, 20);
        assert_eq!(state.previous(), None);
        assert_eq!(state.next(), Some(2));
    }

    #[test]
    fn test_last_page_has_no_next() {
        let state = PageState::new(20, 10, 200);
        assert_eq!(state.previous(), Some(19));
        assert_eq!(state.next(), None);
    }

    #[test]
    fn test_middle_page() {
        let state = PageState::with_pages(2, 10, 200, 20);
        assert_eq!(state.previous(), Some(1));
        assert_eq!(state.next(), Some(3));
    }

    #[test]
    fn test_zero_per_page() {
        let state = PageState::new(1, 0, 5);
        assert_eq!(state.pages, 0);
        assert_eq!(state.next(), None);
    }

    #[test]
    fn test_kaminari_page_counts_pages() {
        let page = KaminariPage::new(vec![1u64, 2, 3], 1, 3, 7);
        assert_eq!(page.num_pages, 3);
        assert_eq!(page.kaminari().unwrap().pages, 3);
        assert!(page.will_paginate().is_none());
    }

    proptest! {
        #[test]
        fn prop_tie_break(current in 0u64..100, pages in 0u64..100) {
            let state = PageState::with_pages(current, 10, pages * 10, pages);
            prop_assert_eq!(state.previous().is_none(), current <= 1);
            prop_assert_eq!(state.next().is_none(), current >= pages);
        }
    }
}
