//! Integration tests for the data-orchestration unit.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use datagrid_lib::config::FilterDescriptor;
use datagrid_lib::config::TableConfig;
use datagrid_lib::error::FetchError;
use datagrid_lib::model::Record;
use datagrid_lib::query::FilterState;
use datagrid_lib::query::Query;
use datagrid_lib::query::Sorting;
use datagrid_lib::source::RecordSource;
use datagrid_lib::storage::MemoryBackend;
use datagrid_lib::storage::Slot;
use datagrid_lib::storage::StorageBackend;
use datagrid_lib::storage::TableStorage;
use datagrid_lib::table::DataTable;
use datagrid_lib::table::Selection;
use serde_json::Value;
use serde_json::json;
use tokio::sync::Notify;

// =============================================================================
// Fixtures
// =============================================================================

/// Returns a fixed list of records and records every query it receives.
#[derive(Default)]
struct StaticSource {
    records: Vec<Value>,
    queries: Mutex<Vec<Query>>,
    calls: AtomicUsize,
    fail: AtomicBool,
}

impl StaticSource {
    fn new(records: Value) -> Arc<Self> {
        let records = match records {
            Value::Array(items) => items,
            other => vec![other],
        };
        Arc::new(Self {
            records,
            ..Self::default()
        })
    }
}

#[async_trait]
impl RecordSource for StaticSource {
    async fn fetch_records(&self, query: &Query) -> Result<Vec<Record>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(FetchError::Shape("endpoint unavailable".to_string()));
        }
        Ok(self.records.iter().cloned().map(Record::new).collect())
    }
}

fn people() -> Value {
    json!([
        {"id": 1, "name": "Ann", "city": "Paris", "age": 31},
        {"id": 2, "name": "Bob", "city": "Berlin", "age": 25},
        {"id": 3, "name": "Cleo", "city": "Paris", "age": 42},
        {"id": 4, "name": "Dan", "city": "Oslo", "age": 19},
    ])
}

fn ids(records: &[Record]) -> Vec<i64> {
    records
        .iter()
        .map(|r| r.get("id").and_then(Value::as_i64).unwrap())
        .collect()
}

struct Harness {
    table: DataTable,
    source: Arc<StaticSource>,
    backend: Arc<MemoryBackend>,
}

impl Harness {
    fn storage_key(&self, slot: Slot) -> String {
        self.table.storage().key(slot)
    }

    fn raw(&self, slot: Slot) -> Option<String> {
        self.backend.raw(&self.storage_key(slot))
    }
}

async fn mount_with(records: Value, config: TableConfig, backend: Arc<MemoryBackend>) -> Harness {
    let source = StaticSource::new(records);
    let shared: Arc<dyn StorageBackend> = backend.clone();
    let storage = TableStorage::with_shared(config.table_id.clone(), shared);
    let dyn_source: Arc<dyn RecordSource> = source.clone();
    let table = DataTable::restore_shared(dyn_source, storage, config).await;
    table.fetch(1, true).await;
    Harness {
        table,
        source,
        backend,
    }
}

async fn mount(records: Value, page_size: usize) -> Harness {
    let config = TableConfig::new("people")
        .with_page_size(page_size)
        .with_filter(FilterDescriptor::text("city", "City"));
    mount_with(records, config, Arc::new(MemoryBackend::new())).await
}

// =============================================================================
// Pagination
// =============================================================================

#[tokio::test]
async fn test_first_page_then_load_more() {
    let h = mount(json!([{"id": 1, "name": "Ann"}, {"id": 2, "name": "Bob"}]), 1).await;

    let snapshot = h.table.snapshot().await;
    assert_eq!(ids(&snapshot.data), [1]);
    assert!(snapshot.has_more);
    assert_eq!(snapshot.total_records, 2);
    assert_eq!(snapshot.current_page, 1);
    assert!(!snapshot.is_loading);

    assert!(h.table.load_more().await);
    let snapshot = h.table.snapshot().await;
    assert_eq!(ids(&snapshot.data), [1, 2]);
    assert!(!snapshot.has_more);
    assert_eq!(snapshot.current_page, 2);
    assert!(!snapshot.is_fetching_next_page);
}

#[tokio::test]
async fn test_load_more_is_noop_without_more_rows() {
    let h = mount(people(), 10).await;
    let calls = h.source.calls.load(Ordering::SeqCst);

    assert!(!h.table.load_more().await);
    assert_eq!(h.source.calls.load(Ordering::SeqCst), calls);
}

#[tokio::test]
async fn test_fetch_page_without_reset_appends() {
    let h = mount(people(), 2).await;
    h.table.fetch(2, false).await;
    assert_eq!(ids(&h.table.snapshot().await.data), [1, 2, 3, 4]);

    h.table.fetch(2, true).await;
    assert_eq!(ids(&h.table.snapshot().await.data), [3, 4]);
}

#[tokio::test]
async fn test_restore_does_not_fetch() {
    let source = StaticSource::new(people());
    let dyn_source: Arc<dyn RecordSource> = source.clone();
    let storage = TableStorage::new("people", MemoryBackend::new());
    let table = DataTable::restore_shared(dyn_source, storage, TableConfig::new("people")).await;

    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    let snapshot = table.snapshot().await;
    assert!(snapshot.data.is_empty());
    assert!(!snapshot.has_more);
    assert_eq!(snapshot.current_page, 0);
    assert!(snapshot.last_fetched_at.is_none());
}

// =============================================================================
// Search, filters, sorting
// =============================================================================

#[tokio::test]
async fn test_search_is_case_insensitive_substring() {
    let h = mount(json!([{"id": 1, "name": "Ann"}, {"id": 2, "name": "Bob"}]), 5).await;

    h.table.set_search_query("an").await;

    let snapshot = h.table.snapshot().await;
    assert_eq!(ids(&snapshot.data), [1]);
    assert_eq!(snapshot.total_records, 1);
    assert_eq!(h.raw(Slot::SearchQuery).as_deref(), Some("\"an\""));
}

#[tokio::test]
async fn test_search_is_sent_as_query_param() {
    let h = mount(people(), 5).await;
    h.table.set_search_query("par").await;

    let last = h.source.queries.lock().unwrap().last().cloned().unwrap();
    assert_eq!(last.search, "par");
    assert_eq!(last.params(), [("q".to_string(), "par".to_string())]);
}

#[tokio::test]
async fn test_unchanged_search_does_not_refetch() {
    let h = mount(people(), 5).await;
    h.table.set_search_query("ann").await;
    let calls = h.source.calls.load(Ordering::SeqCst);

    h.table.set_search_query("ann").await;
    assert_eq!(h.source.calls.load(Ordering::SeqCst), calls);
}

#[tokio::test]
async fn test_filter_change_filters_and_persists() {
    let h = mount(people(), 5).await;

    h.table.handle_filter_change("city", "paris").await;

    let snapshot = h.table.snapshot().await;
    assert_eq!(ids(&snapshot.data), [1, 3]);
    assert_eq!(snapshot.total_records, 2);
    assert_eq!(h.raw(Slot::Filters).as_deref(), Some(r#"{"city":"paris"}"#));
}

#[tokio::test]
async fn test_empty_filter_value_is_inactive() {
    let h = mount(people(), 5).await;
    h.table.handle_filter_change("city", "paris").await;
    h.table.handle_filter_change("city", "").await;

    let snapshot = h.table.snapshot().await;
    assert_eq!(snapshot.total_records, 4);
    assert_eq!(snapshot.filters.non_empty_count(), 0);
}

#[tokio::test]
async fn test_unknown_filter_key_is_ignored() {
    let h = mount(people(), 5).await;
    let calls = h.source.calls.load(Ordering::SeqCst);

    h.table.handle_filter_change("planet", "mars").await;

    assert!(h.table.snapshot().await.filters.is_empty());
    assert_eq!(h.source.calls.load(Ordering::SeqCst), calls);
    assert_eq!(h.raw(Slot::Filters), None);
}

#[tokio::test]
async fn test_sorting_orders_rows_and_persists() {
    let h = mount(people(), 5).await;

    h.table.set_sorting(Some(Sorting::desc("age"))).await;
    assert_eq!(ids(&h.table.snapshot().await.data), [3, 1, 2, 4]);
    assert_eq!(
        h.raw(Slot::Sorting).as_deref(),
        Some(r#"{"column":"age","direction":"desc"}"#)
    );

    h.table.set_sorting(Some(Sorting::asc("name"))).await;
    assert_eq!(ids(&h.table.snapshot().await.data), [1, 2, 3, 4]);

    h.table.set_sorting(None).await;
    assert_eq!(h.raw(Slot::Sorting).as_deref(), Some("null"));
}

// =============================================================================
// Export
// =============================================================================

#[tokio::test]
async fn test_export_matches_paginated_set() {
    let h = mount(people(), 1).await;
    h.table.handle_filter_change("city", "paris").await;
    h.table.set_sorting(Some(Sorting::desc("name"))).await;

    let exported = h.table.export_data().await;
    assert_eq!(ids(&exported), [3, 1]);

    while h.table.load_more().await {}
    assert_eq!(h.table.snapshot().await.data, exported);
    assert!(!h.table.snapshot().await.is_exporting);
}

#[tokio::test]
async fn test_export_failure_yields_empty() {
    let h = mount(people(), 5).await;
    h.source.fail.store(true, Ordering::SeqCst);
    assert!(h.table.export_data().await.is_empty());
}

// =============================================================================
// Reset and restore
// =============================================================================

#[tokio::test]
async fn test_reset_clears_state_and_storage() {
    let h = mount(people(), 5).await;
    h.table.set_search_query("a").await;
    h.table.handle_filter_change("city", "paris").await;
    h.table.set_sorting(Some(Sorting::asc("name"))).await;
    h.table.toggle_row_selected("1").await;

    h.table.reset_all_filters().await;

    let snapshot = h.table.snapshot().await;
    assert_eq!(snapshot.search_query, "");
    assert!(snapshot.filters.is_empty());
    assert_eq!(snapshot.sorting, None);
    assert!(snapshot.selection.is_empty());
    assert_eq!(snapshot.total_records, 4);

    assert_eq!(h.raw(Slot::SearchQuery).as_deref(), Some("\"\""));
    assert_eq!(h.raw(Slot::Filters).as_deref(), Some("{}"));
    assert_eq!(h.raw(Slot::Sorting).as_deref(), Some("null"));
}

#[tokio::test]
async fn test_restores_persisted_state() {
    let backend = Arc::new(MemoryBackend::new());
    backend.insert_raw("mdata-table-people-searchQuery", "\"a\"");
    backend.insert_raw("mdata-table-people-filters", r#"{"city":"paris","planet":"mars"}"#);
    backend.insert_raw("mdata-table-people-sorting", r#"{"column":"name","direction":"desc"}"#);
    backend.insert_raw("mdata-table-people-showAdditionalFilters", "true");

    let config = TableConfig::new("people").with_filter(FilterDescriptor::text("city", "City"));
    let h = mount_with(people(), config, backend).await;

    let snapshot = h.table.snapshot().await;
    assert_eq!(snapshot.search_query, "a");
    assert_eq!(snapshot.sorting, Some(Sorting::desc("name")));
    assert!(snapshot.show_additional_filters);
    assert!(snapshot.filters.get("planet").is_none());
    assert_eq!(ids(&snapshot.data), [3, 1]);
}

#[tokio::test]
async fn test_corrupt_persisted_state_falls_back() {
    let backend = Arc::new(MemoryBackend::new());
    backend.insert_raw("mdata-table-people-filters", "{not json");
    backend.insert_raw("mdata-table-people-sorting", "42");

    let config = TableConfig::new("people");
    let h = mount_with(people(), config, backend).await;

    let snapshot = h.table.snapshot().await;
    assert_eq!(snapshot.filters, FilterState::new());
    assert_eq!(snapshot.sorting, None);
    assert_eq!(snapshot.total_records, 4);
}

#[tokio::test]
async fn test_show_additional_filters_persists() {
    let h = mount(people(), 5).await;
    h.table.set_show_additional_filters(true).await;
    assert!(h.table.snapshot().await.show_additional_filters);
    assert_eq!(h.raw(Slot::ShowAdditionalFilters).as_deref(), Some("true"));
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_fetch_error_keeps_previous_data() {
    let h = mount(people(), 5).await;
    h.source.fail.store(true, Ordering::SeqCst);

    h.table.refresh().await;

    let snapshot = h.table.snapshot().await;
    assert_eq!(ids(&snapshot.data), [1, 2, 3, 4]);
    assert!(snapshot.last_error.unwrap().contains("endpoint unavailable"));
    assert!(!snapshot.is_loading);

    h.source.fail.store(false, Ordering::SeqCst);
    h.table.refresh().await;
    assert!(h.table.snapshot().await.last_error.is_none());
}

// =============================================================================
// Selection
// =============================================================================

#[tokio::test]
async fn test_row_selection() {
    let h = mount(people(), 5).await;

    assert!(h.table.toggle_row_selected("2").await);
    assert!(h.table.toggle_row_selected("4").await);
    assert_eq!(ids(&h.table.selected_records().await), [2, 4]);

    assert!(!h.table.toggle_row_selected("4").await);
    assert_eq!(ids(&h.table.selected_records().await), [2]);

    h.table.set_all_rows_selected(true).await;
    assert_eq!(h.table.snapshot().await.selection.len(), 4);

    h.table.set_sorting(Some(Sorting::desc("age"))).await;
    assert_eq!(h.table.clear_row_selection().await, ["3", "1", "2", "4"]);
    assert!(h.table.snapshot().await.selection.is_empty());

    h.table.set_row_selection(["3"].into_iter().collect::<Selection>()).await;
    assert_eq!(ids(&h.table.snapshot().await.selected_records()), [3]);
}

// =============================================================================
// Out-of-order responses
// =============================================================================

/// Holds back responses for the search text "slow" until released.
struct GatedSource {
    started: Notify,
    release: Notify,
}

#[async_trait]
impl RecordSource for GatedSource {
    async fn fetch_records(&self, query: &Query) -> Result<Vec<Record>, FetchError> {
        if query.search == "slow" {
            self.started.notify_one();
            self.release.notified().await;
            return Ok(vec![Record::new(json!({"id": 1, "name": "slow"}))]);
        }
        Ok(vec![
            Record::new(json!({"id": 2, "name": "fast"})),
            Record::new(json!({"id": 3, "name": "fast too"})),
        ])
    }
}

#[tokio::test]
async fn test_stale_response_is_discarded() {
    let source = Arc::new(GatedSource {
        started: Notify::new(),
        release: Notify::new(),
    });
    let dyn_source: Arc<dyn RecordSource> = source.clone();
    let storage = TableStorage::new("race", MemoryBackend::new());
    let table = DataTable::restore_shared(dyn_source, storage, TableConfig::new("race")).await;
    table.refresh().await;

    let slow = {
        let table = table.clone();
        tokio::spawn(async move { table.set_search_query("slow").await })
    };
    source.started.notified().await;

    table.set_search_query("fast").await;
    source.release.notify_one();
    slow.await.unwrap();

    let snapshot = table.snapshot().await;
    assert_eq!(snapshot.search_query, "fast");
    assert_eq!(ids(&snapshot.data), [2, 3]);
    assert!(!snapshot.is_loading);
}

/// Holds back the first response for `search` until released.
struct HeldSource {
    records: Vec<Value>,
    search: &'static str,
    held: AtomicBool,
    started: Notify,
    release: Notify,
}

#[async_trait]
impl RecordSource for HeldSource {
    async fn fetch_records(&self, query: &Query) -> Result<Vec<Record>, FetchError> {
        if query.search == self.search && !self.held.swap(true, Ordering::SeqCst) {
            self.started.notify_one();
            self.release.notified().await;
        }
        Ok(self.records.iter().cloned().map(Record::new).collect())
    }
}

#[tokio::test]
async fn test_next_page_waits_for_new_query_first_page() {
    let source = Arc::new(HeldSource {
        records: vec![
            json!({"id": 1, "name": "Zed"}),
            json!({"id": 2, "name": "Ann"}),
            json!({"id": 3, "name": "Dan"}),
            json!({"id": 4, "name": "Bob"}),
        ],
        search: "a",
        held: AtomicBool::new(false),
        started: Notify::new(),
        release: Notify::new(),
    });
    let dyn_source: Arc<dyn RecordSource> = source.clone();
    let storage = TableStorage::new("paging", MemoryBackend::new());
    let config = TableConfig::new("paging").with_page_size(1);
    let table = DataTable::restore_shared(dyn_source, storage, config).await;
    table.refresh().await;
    assert_eq!(ids(&table.snapshot().await.data), [1]);

    let search = {
        let table = table.clone();
        tokio::spawn(async move { table.set_search_query("a").await })
    };
    source.started.notified().await;

    assert!(!table.load_more().await);
    // An explicit append cannot extend rows of the previous search.
    table.fetch(2, false).await;
    assert_eq!(ids(&table.snapshot().await.data), [1]);

    source.release.notify_one();
    search.await.unwrap();

    let snapshot = table.snapshot().await;
    assert_eq!(ids(&snapshot.data), [2]);
    assert_eq!(snapshot.current_page, 1);
    assert_eq!(snapshot.total_records, 2);
    assert!(snapshot.has_more);

    assert!(table.load_more().await);
    assert_eq!(ids(&table.snapshot().await.data), [2, 3]);
}
