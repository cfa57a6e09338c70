//! Page window over a filtered row list.

use serde::{Deserialize, Serialize};

/// Rows per page when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Current page of a table.
///
/// Every cursor handed out satisfies `start_index() <= end_index() <=
/// total_items`: construction and [`resize`](Self::resize) clamp the page
/// index to the last valid page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaginationCursor {
    page_index: usize,
    page_size: usize,
    total_items: usize,
}

impl PaginationCursor {
    /// Build a cursor, clamping `page_size` to at least 1 and `page_index`
    /// to the last page that holds rows.
    #[must_use]
    pub fn new(page_index: usize, page_size: usize, total_items: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            page_index: page_index.min(last_page(total_items, page_size)),
            page_size,
            total_items,
        }
    }

    #[must_use]
    pub fn first_page(page_size: usize, total_items: usize) -> Self {
        Self::new(0, page_size, total_items)
    }

    #[must_use]
    pub const fn page_index(&self) -> usize {
        self.page_index
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    #[must_use]
    pub const fn total_items(&self) -> usize {
        self.total_items
    }

    #[must_use]
    pub const fn start_index(&self) -> usize {
        let start = self.page_index.saturating_mul(self.page_size);
        if start > self.total_items {
            self.total_items
        } else {
            start
        }
    }

    #[must_use]
    pub const fn end_index(&self) -> usize {
        let end = self.start_index().saturating_add(self.page_size);
        if end > self.total_items {
            self.total_items
        } else {
            end
        }
    }

    /// Number of pages; an empty table still has one (empty) page.
    #[must_use]
    pub const fn page_count(&self) -> usize {
        last_page(self.total_items, self.page_size) + 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.start_index().saturating_add(self.page_size) < self.total_items
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page_index > 0
    }

    /// Next page, or `self` when already on the last one.
    #[must_use]
    pub const fn forward(self) -> Self {
        if self.has_next() {
            Self {
                page_index: self.page_index + 1,
                ..self
            }
        } else {
            self
        }
    }

    /// Previous page, clamped at the first.
    #[must_use]
    pub const fn back(self) -> Self {
        Self {
            page_index: self.page_index.saturating_sub(1),
            ..self
        }
    }

    /// Re-fit the cursor to a new row count.
    ///
    /// Must be called whenever the filter state changes upstream, since the
    /// filtered row count changes with it. The page is kept when still valid
    /// and clamped to the last page otherwise.
    #[must_use]
    pub fn resize(self, total_items: usize) -> Self {
        Self::new(self.page_index, self.page_size, total_items)
    }

    /// Change the page size, keeping the first visible row on screen.
    #[must_use]
    pub fn set_page_size(self, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self::new(self.start_index() / page_size, page_size, self.total_items)
    }

    /// Rows of `items` visible on this page.
    ///
    /// `items` may be shorter than `total_items` (a page not loaded yet);
    /// the window is clipped to what is there.
    #[must_use]
    pub fn slice<'t, T>(&self, items: &'t [T]) -> &'t [T] {
        let start = self.start_index().min(items.len());
        let end = self.end_index().min(items.len());
        &items[start..end]
    }

    /// One-based `(first, last, total)` for a "Showing first–last of total"
    /// label. `first` is 0 for an empty table.
    #[must_use]
    pub const fn display_range(&self) -> (usize, usize, usize) {
        let first = if self.total_items == 0 {
            0
        } else {
            self.start_index() + 1
        };
        (first, self.end_index(), self.total_items)
    }
}

const fn last_page(total_items: usize, page_size: usize) -> usize {
    if total_items == 0 {
        0
    } else {
        (total_items - 1) / page_size
    }
}
