//! Pagination options and list result types.
//!
//! List queries are paginated with 1-indexed pages. A requested page of 0 (or
//! none at all) is clamped to page 1, and a limit of 0 (or none) falls back
//! to the default of 25 per page, matching the layer's list semantics.

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::query::SortSpec;

/// Default number of records per page.
pub const DEFAULT_LIMIT: u64 = 25;

/// Options recognized by [`RecordAccess::list`](crate::records::RecordAccess::list).
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Sort specification; `None` leaves records in the store's natural order.
    pub sort: Option<SortSpec>,
    /// 1-indexed page number; `None` or `Some(0)` means page 1.
    pub page: Option<u64>,
    /// Records per page; `None` or `Some(0)` means [`DEFAULT_LIMIT`].
    pub limit: Option<u64>,
}

impl ListOptions {
    /// Creates empty options: natural order, page 1, default limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sort specification.
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Sets the 1-indexed page number.
    pub fn with_page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    /// Sets the number of records per page.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The effective page, clamped to a minimum of 1.
    pub fn page_or_default(&self) -> u64 {
        match self.page {
            None | Some(0) => 1,
            Some(page) => page,
        }
    }

    /// The effective per-page limit, falling back to [`DEFAULT_LIMIT`].
    pub fn limit_or_default(&self) -> u64 {
        match self.limit {
            None | Some(0) => DEFAULT_LIMIT,
            Some(limit) => limit,
        }
    }

    /// Number of records to skip for the effective page.
    pub fn skip(&self) -> u64 {
        self.limit_or_default() * (self.page_or_default() - 1)
    }
}

/// One page of records matching a list query, with pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResult {
    /// The effective 1-indexed page that was fetched.
    pub page: u64,
    /// Total count of records matching the filter across all pages.
    pub count: u64,
    /// The effective per-page limit.
    pub limit: u64,
    /// Total number of pages: `ceil(count / limit)`.
    pub pages: u64,
    /// The records on this page, in query order.
    pub records: Vec<Document>,
}

impl ListResult {
    /// Assembles a list result, deriving `pages` from `count` and `limit`.
    pub fn new(page: u64, count: u64, limit: u64, records: Vec<Document>) -> Self {
        ListResult {
            page,
            count,
            limit,
            pages: count.div_ceil(limit.max(1)),
            records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_and_limit_defaults() {
        let options = ListOptions::new();
        assert_eq!(options.page_or_default(), 1);
        assert_eq!(options.limit_or_default(), DEFAULT_LIMIT);
        assert_eq!(options.skip(), 0);
    }

    #[test]
    fn zero_values_fall_back_to_defaults() {
        let options = ListOptions::new().with_page(0).with_limit(0);
        assert_eq!(options.page_or_default(), 1);
        assert_eq!(options.limit_or_default(), DEFAULT_LIMIT);
    }

    #[test]
    fn skip_math() {
        let options = ListOptions::new().with_page(4).with_limit(10);
        assert_eq!(options.skip(), 30);
    }

    #[test]
    fn pages_is_ceiling_of_count_over_limit() {
        assert_eq!(ListResult::new(1, 30, 10, Vec::new()).pages, 3);
        assert_eq!(ListResult::new(1, 31, 10, Vec::new()).pages, 4);
        assert_eq!(ListResult::new(1, 0, 10, Vec::new()).pages, 0);
    }
}
