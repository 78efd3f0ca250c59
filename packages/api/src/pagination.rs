// ABOUTME: Pagination utilities for list endpoints
// ABOUTME: Query parameters with clamped limits and a response wrapper with page metadata

use serde::{Deserialize, Serialize};

/// Page size used when the query omits `limit`
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Upper bound for `limit`
pub const MAX_PAGE_SIZE: i64 = 100;

/// First page number; pages are 1-indexed
pub const MIN_PAGE: i64 = 1;

/// `page` and `limit` query parameters for list endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationParams {
    /// Requested page, defaults to `MIN_PAGE`
    #[serde(default = "default_page")]
    pub page: i64,

    /// Items per page, defaults to `DEFAULT_PAGE_SIZE` and is clamped to `MAX_PAGE_SIZE`
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    MIN_PAGE
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl PaginationParams {
    /// Build params from raw values; clamping happens on read
    pub fn with_page_and_limit(page: i64, limit: i64) -> Self {
        Self { page, limit }
    }

    /// Normalize the raw values
    /// Returns (limit, offset) suitable for SQL queries
    pub fn validate(&self) -> (i64, i64) {
        let page = self.page.max(MIN_PAGE);
        let limit = self.limit.clamp(1, MAX_PAGE_SIZE);
        (limit, (page - 1) * limit)
    }

    /// SQL LIMIT value
    pub fn limit(&self) -> i64 {
        self.validate().0
    }

    /// SQL OFFSET value
    pub fn offset(&self) -> i64 {
        self.validate().1
    }

    /// Current page, never below `MIN_PAGE`
    pub fn page(&self) -> i64 {
        self.page.max(MIN_PAGE)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self::with_page_and_limit(MIN_PAGE, DEFAULT_PAGE_SIZE)
    }
}

/// Page metadata returned alongside a page of results
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    /// Current page (1-indexed)
    pub page: i64,

    /// Items per page after clamping
    pub page_size: i64,

    /// Matching items across all pages
    pub total_items: i64,

    /// Number of pages, 0 when nothing matched
    pub total_pages: i64,

    /// Whether a later page exists
    pub has_next_page: bool,

    /// Whether an earlier page exists
    pub has_previous_page: bool,
}

impl PaginationMeta {
    /// Compute metadata for `params` given the total match count
    pub fn new(params: &PaginationParams, total_items: i64) -> Self {
        let page = params.page();
        let page_size = params.limit();
        let total_pages = (total_items + page_size - 1) / page_size;

        Self {
            page,
            page_size,
            total_items,
            total_pages,
            has_next_page: page < total_pages,
            has_previous_page: page > MIN_PAGE,
        }
    }
}

/// A page of items plus its metadata
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    /// Items on this page
    pub data: Vec<T>,

    /// Page metadata
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    /// Wrap one page of `data` with metadata for `params`
    pub fn new(data: Vec<T>, params: &PaginationParams, total_items: i64) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(params, total_items),
        }
    }
}
