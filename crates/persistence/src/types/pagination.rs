//! Pagination types for list results.
//!
//! Metadata is derived from the window count returned alongside a page of rows
//! and is never stored.

use serde::{Deserialize, Serialize};

/// Derived pagination metadata for a list result.
///
/// When there are no matching records every field is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// The page that was requested.
    pub current_page: u32,
    /// The page size that was requested.
    pub page_size: u32,
    /// Always 1 when there is at least one record.
    pub first_page: u32,
    /// `ceil(total_records / page_size)`.
    pub last_page: u32,
    /// Number of records matching the filters across all pages.
    pub total_records: u64,
}

impl Metadata {
    /// Computes metadata for `total_records` split into pages of `page_size`.
    pub fn calculate(total_records: u64, page: u32, page_size: u32) -> Self {
        if total_records == 0 || page_size == 0 {
            return Self::default();
        }

        let last_page = total_records.div_ceil(u64::from(page_size));
        Self {
            current_page: page,
            page_size,
            first_page: 1,
            last_page: u32::try_from(last_page).unwrap_or(u32::MAX),
            total_records,
        }
    }

    /// Returns true if there is a page after the current one.
    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }
}

/// A page of list results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// The records on this page, in sort order.
    pub items: Vec<T>,

    /// Pagination information.
    pub metadata: Metadata,
}

impl<T> Page<T> {
    /// Creates a new page with the given items and metadata.
    pub fn new(items: Vec<T>, metadata: Metadata) -> Self {
        Self { items, metadata }
    }

    /// Creates an empty page.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            metadata: Metadata::default(),
        }
    }

    /// Returns true if this page has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Maps the items to a different type.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            metadata: self.metadata,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}
