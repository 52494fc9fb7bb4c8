//! Reactive table state.

use chrono::DateTime;
use chrono::Utc;

use super::Selection;
use super::row_id;
use crate::model::Record;
use crate::query::FilterState;
use crate::query::Query;
use crate::query::Sorting;

/// Mutable state behind a [`DataTable`](super::DataTable).
#[derive(Debug, Default)]
pub(crate) struct TableState {
    pub data: Vec<Record>,
    pub search_query: String,
    pub filters: FilterState,
    pub sorting: Option<Sorting>,
    pub show_additional_filters: bool,
    pub has_more: bool,
    pub total_records: usize,
    pub current_page: usize,
    pub selection: Selection,
    pub last_error: Option<String>,
    pub last_fetched_at: Option<DateTime<Utc>>,

    /// First-page requests in flight.
    pub loading: usize,
    /// Next-page requests in flight.
    pub fetching_next_page: usize,
    /// Export requests in flight.
    pub exporting: usize,

    /// Bumped on every query change; responses from older generations are dropped.
    pub generation: u64,
    /// Generation the held `data` was fetched under.
    pub data_generation: u64,
    /// Sequence number of the last applied response.
    pub applied_seq: u64,
}

impl TableState {
    pub fn query(&self) -> Query {
        Query::new(self.search_query.clone(), self.filters.clone())
    }

    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            data: self.data.clone(),
            search_query: self.search_query.clone(),
            filters: self.filters.clone(),
            sorting: self.sorting.clone(),
            show_additional_filters: self.show_additional_filters,
            is_loading: self.loading > 0,
            is_fetching_next_page: self.fetching_next_page > 0,
            is_exporting: self.exporting > 0,
            has_more: self.has_more,
            total_records: self.total_records,
            current_page: self.current_page,
            selection: self.selection.clone(),
            last_error: self.last_error.clone(),
            last_fetched_at: self.last_fetched_at,
        }
    }
}

/// An owned copy of a table's reactive state, for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSnapshot {
    /// Rows fetched so far (every loaded page).
    pub data: Vec<Record>,
    pub search_query: String,
    pub filters: FilterState,
    pub sorting: Option<Sorting>,
    pub show_additional_filters: bool,
    /// A first-page fetch is in flight.
    pub is_loading: bool,
    /// A next-page fetch is in flight.
    pub is_fetching_next_page: bool,
    /// An export fetch is in flight.
    pub is_exporting: bool,
    /// More rows exist past the loaded pages.
    pub has_more: bool,
    /// Rows matching search and filters.
    pub total_records: usize,
    /// Last page applied (0 before the first fetch).
    pub current_page: usize,
    pub selection: Selection,
    /// Message of the most recent failed fetch, cleared on success.
    pub last_error: Option<String>,
    /// When data was last applied.
    pub last_fetched_at: Option<DateTime<Utc>>,
}

impl TableSnapshot {
    /// Row ids of loaded rows that are selected, in display order.
    pub fn selected_row_ids(&self) -> Vec<String> {
        selected_ids_in(&self.data, &self.selection)
    }

    /// Loaded records whose rows are selected.
    pub fn selected_records(&self) -> Vec<Record> {
        selected_in(&self.data, &self.selection)
    }
}

pub(crate) fn selected_ids_in(data: &[Record], selection: &Selection) -> Vec<String> {
    data.iter()
        .enumerate()
        .map(|(index, record)| row_id(record, index))
        .filter(|id| selection.is_selected(id))
        .collect()
}

/// Records of `data` whose row ids are in `selection`, in display order.
pub(crate) fn selected_in(data: &[Record], selection: &Selection) -> Vec<Record> {
    data.iter()
        .enumerate()
        .filter(|(index, record)| selection.is_selected(&row_id(record, *index)))
        .map(|(_, record)| record.clone())
        .collect()
}
