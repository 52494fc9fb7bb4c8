//! Client-side search, filter, sort and pagination passes.
//!
//! Display and export share [`apply`], so the rows a table paginates over
//! and the rows an export writes are always the same set.

use std::cmp::Ordering;

use crate::model::Record;
use crate::model::contains_ignore_case;
use crate::model::display_string;
use crate::query::PageWindow;
use crate::query::Query;
use crate::query::Sorting;

/// Result of slicing one page out of the filtered rows.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice {
    /// Rows inside the page window.
    pub rows: Vec<Record>,
    /// Number of rows after search and filters.
    pub total: usize,
    /// Whether rows remain past the window.
    pub has_more: bool,
}

/// Keeps records where any field value contains `search`, ignoring case.
///
/// An empty search keeps everything.
pub fn search(records: Vec<Record>, search: &str) -> Vec<Record> {
    if search.is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|record| {
            record
                .values()
                .into_iter()
                .any(|value| contains_ignore_case(&display_string(value), search))
        })
        .collect()
}

/// Runs the search pass, the filter pass and the sort pass, in that order.
pub fn apply(records: Vec<Record>, query: &Query, sorting: Option<&Sorting>) -> Vec<Record> {
    let mut rows = search(records, &query.search);
    if query.filters.active().next().is_some() {
        rows.retain(|record| query.filters.matches(record));
    }
    if let Some(sorting) = sorting {
        stable_sort_by(&mut rows, |a, b| sorting.compare(a, b));
    }
    rows
}

/// Runs [`apply`] and slices the window for `page`.
pub fn paginate(
    records: Vec<Record>,
    query: &Query,
    sorting: Option<&Sorting>,
    page: usize,
    page_size: usize,
) -> PageSlice {
    let rows = apply(records, query, sorting);
    let window = PageWindow::new(page, page_size);
    PageSlice {
        rows: window.slice(&rows).to_vec(),
        total: rows.len(),
        has_more: window.has_more(rows.len()),
    }
}

/// Stable merge sort.
///
/// Loose comparison is not a total order once mixed types or missing fields
/// are involved, and `slice::sort_by` may panic on such orders. This sort
/// takes from the right run only on `Less` and never panics.
pub fn stable_sort_by<T: Clone>(items: &mut [T], mut compare: impl FnMut(&T, &T) -> Ordering) {
    let len = items.len();
    if len < 2 {
        return;
    }
    let mut buffer = items.to_vec();
    let mut width = 1;
    while width < len {
        let mut start = 0;
        while start < len {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            let (mut left, mut right, mut out) = (start, mid, start);
            while left < mid && right < end {
                if compare(&items[right], &items[left]) == Ordering::Less {
                    buffer[out] = items[right].clone();
                    right += 1;
                } else {
                    buffer[out] = items[left].clone();
                    left += 1;
                }
                out += 1;
            }
            while left < mid {
                buffer[out] = items[left].clone();
                left += 1;
                out += 1;
            }
            while right < end {
                buffer[out] = items[right].clone();
                right += 1;
                out += 1;
            }
            start = end;
        }
        items.clone_from_slice(&buffer);
        width *= 2;
    }
}
