//! Query state for the client-side pipeline.
//!
//! - [`FilterState`] / [`FilterValue`] - per-field filter values
//! - [`Sorting`] / [`SortDirection`] - the single active sort
//! - [`PageWindow`] - the slice of filtered data shown for a page
//! - [`Query`] - search text plus filters, rendered as request parameters

mod filter;
mod order;
mod page;

pub use filter::FilterState;
pub use filter::FilterValue;
pub use order::SortDirection;
pub use order::Sorting;
pub use page::PageWindow;

/// Search text and filters that shape a request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Free-text search applied across every field.
    pub search: String,
    /// Per-field filters.
    pub filters: FilterState,
}

impl Query {
    /// Creates a query from search text and filters.
    pub fn new(search: impl Into<String>, filters: FilterState) -> Self {
        Self {
            search: search.into(),
            filters,
        }
    }

    /// Returns the request parameters for this query.
    ///
    /// `q` carries the search text when set, followed by one pair per active
    /// filter in key order. Inactive values are omitted.
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if !self.search.is_empty() {
            params.push(("q".to_string(), self.search.clone()));
        }
        for (key, value) in self.filters.active() {
            params.push((key.to_string(), value.to_string()));
        }
        params
    }
}
