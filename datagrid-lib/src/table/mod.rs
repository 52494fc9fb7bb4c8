//! Data-orchestration unit.
//!
//! [`DataTable`] owns the fetch lifecycle of one table: it reads the
//! current search, filters and sort, asks its [`RecordSource`] for
//! records, runs the client-side [`pipeline`](crate::pipeline) and exposes
//! the resulting page state. UI state is mirrored into [`TableStorage`]
//! after every change.
//!
//! Responses can arrive out of order. Every fetch carries a sequence
//! number and the query generation it was issued for; a response is
//! applied only while its generation is current and it is newer than the
//! last applied response.

mod selection;
mod state;

pub use selection::Selection;
pub use selection::row_id;
pub use state::TableSnapshot;

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::config::TableConfig;
use crate::model::Record;
use crate::pipeline;
use crate::query::FilterState;
use crate::query::FilterValue;
use crate::query::Query;
use crate::query::Sorting;
use crate::source::RecordSource;
use crate::storage::Slot;
use crate::storage::TableStorage;
use state::TableState;

/// Handle to one table's data and UI state.
///
/// Cheap to clone (uses `Arc` internally); clones share state, so a
/// front-end can hand one clone to a scroll watcher and keep another for
/// rendering.
///
/// # Example
///
/// ```ignore
/// use datagrid_lib::config::TableConfig;
/// use datagrid_lib::source::HttpSource;
/// use datagrid_lib::storage::{MemoryBackend, TableStorage};
/// use datagrid_lib::table::DataTable;
///
/// let config = TableConfig::new("users-table").with_page_size(10);
/// let storage = TableStorage::new(&config.table_id, MemoryBackend::new());
/// let source = HttpSource::new("https://jsonplaceholder.typicode.com/users")?;
///
/// let table = DataTable::mount(source, storage, config).await;
/// table.set_search_query("ann").await;
/// let snapshot = table.snapshot().await;
/// println!("{} of {}", snapshot.data.len(), snapshot.total_records);
/// ```
#[derive(Clone)]
pub struct DataTable {
    inner: Arc<DataTableInner>,
}

struct DataTableInner {
    source: Arc<dyn RecordSource>,
    storage: TableStorage,
    config: TableConfig,
    state: Mutex<TableState>,
    next_seq: AtomicU64,
}

/// What a fetch was issued for.
struct FetchTicket {
    page: usize,
    reset: bool,
    query: Query,
    sorting: Option<Sorting>,
    seq: u64,
    generation: u64,
}

impl DataTable {
    /// Creates a table and restores its persisted UI state, without fetching.
    pub async fn restore(
        source: impl RecordSource + 'static,
        storage: TableStorage,
        config: TableConfig,
    ) -> Self {
        Self::restore_shared(Arc::new(source), storage, config).await
    }

    /// Like [`restore`](Self::restore), for a source shared with other tables.
    pub async fn restore_shared(
        source: Arc<dyn RecordSource>,
        storage: TableStorage,
        config: TableConfig,
    ) -> Self {
        let search_query: String = storage.load(Slot::SearchQuery, String::new()).await;
        let mut filters: FilterState = storage.load(Slot::Filters, FilterState::new()).await;
        let sorting: Option<Sorting> = storage.load(Slot::Sorting, None).await;
        let show_additional_filters: bool =
            storage.load(Slot::ShowAdditionalFilters, false).await;

        filters.retain(|key| {
            let accepted = config.accepts_filter_key(key);
            if !accepted {
                log::warn!("Dropping persisted filter for unknown key {:?}", key);
            }
            accepted
        });

        let state = TableState {
            search_query,
            filters,
            sorting,
            show_additional_filters,
            ..TableState::default()
        };

        Self {
            inner: Arc::new(DataTableInner {
                source,
                storage,
                config,
                state: Mutex::new(state),
                next_seq: AtomicU64::new(1),
            }),
        }
    }

    /// Restores persisted state and performs the initial fetch.
    pub async fn mount(
        source: impl RecordSource + 'static,
        storage: TableStorage,
        config: TableConfig,
    ) -> Self {
        let table = Self::restore(source, storage, config).await;
        table.fetch(1, true).await;
        table
    }

    /// Returns the table configuration.
    pub fn config(&self) -> &TableConfig {
        &self.inner.config
    }

    /// Returns the storage adapter.
    pub fn storage(&self) -> &TableStorage {
        &self.inner.storage
    }

    /// Returns an owned copy of the current state.
    pub async fn snapshot(&self) -> TableSnapshot {
        self.inner.state.lock().await.snapshot()
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    /// Fetches `page` and replaces (page 1 or `reset`) or appends the rows.
    ///
    /// Errors are logged and leave the data untouched.
    pub async fn fetch(&self, page: usize, reset: bool) {
        let ticket = {
            let mut state = self.inner.state.lock().await;
            self.issue(&mut state, page, reset)
        };
        self.run(ticket).await;
    }

    /// Re-fetches page 1 with the current query.
    pub async fn refresh(&self) {
        self.fetch(1, true).await;
    }

    /// Fetches the next page in append mode.
    ///
    /// Does nothing unless more rows remain and no fetch of page 1 or of a
    /// next page is in flight. Returns `true` if a fetch was made.
    pub async fn load_more(&self) -> bool {
        let ticket = {
            let mut state = self.inner.state.lock().await;
            if !state.has_more || state.loading > 0 || state.fetching_next_page > 0 {
                return false;
            }
            let page = state.current_page + 1;
            self.issue(&mut state, page, false)
        };
        self.run(ticket).await;
        true
    }

    /// Fetches every row matching the current search, filters and sort.
    ///
    /// Uses the same passes as [`fetch`](Self::fetch) without pagination.
    /// Failures are logged and yield an empty list.
    pub async fn export_data(&self) -> Vec<Record> {
        let (query, sorting) = {
            let mut state = self.inner.state.lock().await;
            state.exporting += 1;
            (state.query(), state.sorting.clone())
        };

        let result = self.inner.source.fetch_records(&query).await;

        self.inner.state.lock().await.exporting -= 1;

        match result {
            Ok(records) => pipeline::apply(records, &query, sorting.as_ref()),
            Err(e) => {
                log::error!("Error exporting data: {}", e);
                Vec::new()
            }
        }
    }

    fn issue(&self, state: &mut TableState, page: usize, reset: bool) -> FetchTicket {
        let page = page.max(1);
        if page == 1 {
            state.loading += 1;
        } else {
            state.fetching_next_page += 1;
        }
        FetchTicket {
            page,
            reset,
            query: state.query(),
            sorting: state.sorting.clone(),
            seq: self.inner.next_seq.fetch_add(1, Ordering::Relaxed),
            generation: state.generation,
        }
    }

    async fn run(&self, ticket: FetchTicket) {
        let result = self.inner.source.fetch_records(&ticket.query).await;

        let mut state = self.inner.state.lock().await;
        let replaces = ticket.reset || ticket.page == 1;
        // Appends only extend rows fetched under the same query.
        let current = ticket.generation == state.generation
            && ticket.seq > state.applied_seq
            && (replaces || ticket.generation == state.data_generation);

        match result {
            Ok(records) if current => {
                let slice = pipeline::paginate(
                    records,
                    &ticket.query,
                    ticket.sorting.as_ref(),
                    ticket.page,
                    self.inner.config.page_size,
                );
                if replaces {
                    state.data = slice.rows;
                    state.data_generation = ticket.generation;
                } else {
                    state.data.extend(slice.rows);
                }
                state.total_records = slice.total;
                state.has_more = slice.has_more;
                state.current_page = ticket.page;
                state.applied_seq = ticket.seq;
                state.last_error = None;
                state.last_fetched_at = Some(Utc::now());
            }
            Ok(_) => {
                log::debug!(
                    "Discarding stale response for page {} (seq {}, generation {})",
                    ticket.page,
                    ticket.seq,
                    ticket.generation
                );
            }
            Err(e) => {
                log::error!("Error fetching data: {}", e);
                if current {
                    state.last_error = Some(e.to_string());
                }
            }
        }

        if ticket.page == 1 {
            state.loading = state.loading.saturating_sub(1);
        } else {
            state.fetching_next_page = state.fetching_next_page.saturating_sub(1);
        }
    }

    // =========================================================================
    // Setters
    // =========================================================================

    /// Sets the search text; re-fetches page 1 if it changed.
    pub async fn set_search_query(&self, search_query: impl Into<String>) {
        let search_query = search_query.into();
        {
            let mut state = self.inner.state.lock().await;
            if state.search_query == search_query {
                return;
            }
            state.search_query = search_query.clone();
            state.generation += 1;
        }
        self.inner.storage.save(Slot::SearchQuery, &search_query).await;
        self.refresh().await;
    }

    /// Sets or clears the sort; re-fetches page 1 if it changed.
    pub async fn set_sorting(&self, sorting: Option<Sorting>) {
        {
            let mut state = self.inner.state.lock().await;
            if state.sorting == sorting {
                return;
            }
            state.sorting = sorting.clone();
            state.generation += 1;
        }
        self.inner.storage.save(Slot::Sorting, &sorting).await;
        self.refresh().await;
    }

    /// Merges one filter value; re-fetches page 1 if it changed.
    ///
    /// Keys outside the configured filter descriptors are ignored.
    pub async fn handle_filter_change(&self, key: &str, value: impl Into<FilterValue>) {
        if !self.inner.config.accepts_filter_key(key) {
            log::warn!("Ignoring change to unknown filter key {:?}", key);
            return;
        }
        let value = value.into();
        let filters = {
            let mut state = self.inner.state.lock().await;
            if state.filters.get(key) == Some(&value) {
                return;
            }
            state.filters.set(key, value);
            state.generation += 1;
            state.filters.clone()
        };
        self.inner.storage.save(Slot::Filters, &filters).await;
        self.refresh().await;
    }

    /// Shows or hides the additional-filter panel.
    pub async fn set_show_additional_filters(&self, show: bool) {
        self.inner.state.lock().await.show_additional_filters = show;
        self.inner.storage.save(Slot::ShowAdditionalFilters, &show).await;
    }

    /// Clears search, filters, sort and row selection, persists the cleared
    /// values and re-fetches page 1.
    pub async fn reset_all_filters(&self) {
        {
            let mut state = self.inner.state.lock().await;
            state.search_query.clear();
            state.filters = FilterState::new();
            state.sorting = None;
            state.selection.clear();
            state.generation += 1;
        }
        let storage = &self.inner.storage;
        storage.save(Slot::SearchQuery, "").await;
        storage.save(Slot::Filters, &FilterState::new()).await;
        storage.save(Slot::Sorting, &None::<Sorting>).await;
        self.refresh().await;
    }

    // =========================================================================
    // Row selection
    // =========================================================================

    /// Replaces the row selection.
    pub async fn set_row_selection(&self, selection: Selection) {
        self.inner.state.lock().await.selection = selection;
    }

    /// Toggles one row. Returns the row's new state.
    pub async fn toggle_row_selected(&self, row_id: &str) -> bool {
        self.inner.state.lock().await.selection.toggle(row_id)
    }

    /// Selects or deselects every loaded row.
    pub async fn set_all_rows_selected(&self, selected: bool) {
        let mut state = self.inner.state.lock().await;
        let ids: Vec<String> = state
            .data
            .iter()
            .enumerate()
            .map(|(index, record)| row_id(record, index))
            .collect();
        state.selection.set_all(ids.iter().map(String::as_str), selected);
    }

    /// Clears the row selection.
    ///
    /// Returns the ids of loaded rows that were selected, in display order.
    /// Selected ids with no loaded row are dropped.
    pub async fn clear_row_selection(&self) -> Vec<String> {
        let mut state = self.inner.state.lock().await;
        let ids = state::selected_ids_in(&state.data, &state.selection);
        state.selection.clear();
        ids
    }

    /// Loaded records whose rows are selected.
    pub async fn selected_records(&self) -> Vec<Record> {
        let state = self.inner.state.lock().await;
        state::selected_in(&state.data, &state.selection)
    }
}
