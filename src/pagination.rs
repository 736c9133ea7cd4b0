use serde::Serialize;

/// Default page size used by listing services.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 25;

/// Page selection applied to a listing query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page number.
    pub page: usize,
    /// Number of items per page.
    pub per_page: usize,
}

/// A single page of results together with paging metadata.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, page: usize, total_pages: usize) -> Self {
        Self {
            items,
            page,
            total_pages,
        }
    }
}
