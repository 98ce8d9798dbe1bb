//! List request parameters.
//!
//! [`ListParams`] carries the page window and sort key of a list call. Sort
//! keys are checked against a per-record safelist before any query is built,
//! so user input never reaches storage as a column name.

use serde::{Deserialize, Serialize};

use crate::validation::{Validator, permitted_value};

/// Highest page number a list call may request.
pub const MAX_PAGE: u32 = 10_000_000;

/// Page window and sort key for a list call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: u32,

    /// Records per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Sort key, optionally prefixed with `-` for descending order.
    #[serde(default = "default_sort")]
    pub sort: String,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

fn default_sort() -> String {
    "id".to_string()
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
            sort: default_sort(),
        }
    }
}

impl ListParams {
    /// Creates params for `page` of `page_size` records sorted by `id`.
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            ..Default::default()
        }
    }

    /// Sets the sort key.
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = sort.into();
        self
    }

    /// Checks the page window and the sort key against `safelist`.
    pub fn validate(&self, v: &mut Validator, safelist: &[&str], max_page_size: u32) {
        v.check(self.page > 0, "page", "must be greater than zero");
        v.check(self.page <= MAX_PAGE, "page", "must be a maximum of 10 million");
        v.check(self.page_size > 0, "page_size", "must be greater than zero");
        v.check(
            self.page_size <= max_page_size,
            "page_size",
            format!("must be a maximum of {}", max_page_size),
        );
        v.check(
            permitted_value(&self.sort.as_str(), safelist),
            "sort",
            "invalid sort value",
        );
    }

    /// Parses the sort key.
    pub fn sort_directive(&self) -> SortDirective {
        SortDirective::parse(&self.sort)
    }

    /// Number of rows to skip for the requested page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// Number of rows to fetch.
    pub fn limit(&self) -> u32 {
        self.page_size
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

impl SortDirection {
    /// SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// A parsed sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortDirective {
    /// The key with any direction prefix removed.
    pub key: String,
    /// The sort direction.
    pub direction: SortDirection,
}

impl SortDirective {
    /// Parses a sort value (e.g., "-name" for descending).
    pub fn parse(s: &str) -> Self {
        if let Some(stripped) = s.strip_prefix('-') {
            Self {
                key: stripped.to_string(),
                direction: SortDirection::Descending,
            }
        } else {
            Self {
                key: s.to_string(),
                direction: SortDirection::Ascending,
            }
        }
    }
}
