//! Client-side pagination over a normalized result
//!
//! Pages are 1-based. Slicing is pure; the `Pager` holds the current page and
//! ignores navigation requests that fall outside `1..=total_pages`.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 50;

/// `rows[(page-1)*page_size .. page*page_size]`, clipped to the input.
///
/// `page == 0` or `page_size == 0` yields an empty slice.
pub fn slice<T>(rows: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size).min(rows.len());
    let end = page.saturating_mul(page_size).min(rows.len());
    &rows[start..end]
}

/// `ceil(total_rows / page_size)`, or 0 when `page_size` is 0.
pub fn total_pages(total_rows: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        total_rows.div_ceil(page_size)
    }
}

/// "Showing 51-100 of 120", or an empty string when the page shows no rows.
pub fn showing_range(page: usize, page_size: usize, total_rows: usize) -> String {
    if total_rows == 0 || page == 0 || page_size == 0 {
        return String::new();
    }
    let offset = (page - 1).saturating_mul(page_size);
    if offset >= total_rows {
        return String::new();
    }
    let end = page.saturating_mul(page_size).min(total_rows);
    format!("Showing {}-{} of {}", offset + 1, end, total_rows)
}

/// Current page + page size for one grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pager {
    current_page: usize,
    page_size: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self, total_rows: usize) -> usize {
        total_pages(total_rows, self.page_size)
    }

    /// Move to `page` if it exists. Returns whether the page changed.
    pub fn go_to_page(&mut self, page: usize, total_rows: usize) -> bool {
        if page >= 1 && page <= self.total_pages(total_rows) {
            self.current_page = page;
            true
        } else {
            false
        }
    }

    pub fn next_page(&mut self, total_rows: usize) -> bool {
        self.go_to_page(self.current_page + 1, total_rows)
    }

    pub fn prev_page(&mut self, total_rows: usize) -> bool {
        match self.current_page.checked_sub(1) {
            Some(page) => self.go_to_page(page, total_rows),
            None => false,
        }
    }

    pub fn page_of<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        slice(rows, self.current_page, self.page_size)
    }

    pub fn showing_range(&self, total_rows: usize) -> String {
        showing_range(self.current_page, self.page_size, total_rows)
    }
}
